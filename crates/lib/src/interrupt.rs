//! # Operator Interrupt
//!
//! A cloneable flag that the driver trips on Ctrl-C. Long-running stages check it
//! between items and race it against in-flight calls so they can hand back
//! whatever they have produced so far.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct Interrupt {
    tx: Arc<watch::Sender<bool>>,
}

impl Interrupt {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Marks the run as interrupted. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Interrupt::trigger`] has been called.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on a trigger.
        let _ = rx.wait_for(|interrupted| *interrupted).await;
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}
