//! # Feed Fetching Contract
//!
//! Every event source is a plugin that implements [`EventFetcher`]. The driver
//! picks one strategy by configuration and treats it polymorphically, the same
//! way it would treat any other source.

use crate::types::RawEvent;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// A generic error type for all feed plugins.
///
/// Each plugin maps its specific errors (zip, CSV, JSON, HTTP status) into these
/// standardized variants so the driver can handle them uniformly.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No report was published for any date in the look-back window.
    #[error("No report found within {days} day(s) back from {start_date}")]
    NotFoundExhausted { start_date: NaiveDate, days: u32 },

    /// A network, TLS or unexpected HTTP status failure. Always fatal.
    #[error("Failed to fetch from the feed: {0}")]
    Transport(String),

    #[error("Failed to parse the feed content: {0}")]
    Parse(String),

    #[error("Feed configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// What a fetch should look for.
///
/// The tabular feed uses `start_date`; the social feed uses `query` and falls
/// back to its built-in query when it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCriteria {
    pub start_date: NaiveDate,
    pub query: Option<String>,
}

impl FetchCriteria {
    pub fn for_date(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            query: None,
        }
    }
}

/// The contract for a feed plugin.
#[async_trait]
pub trait EventFetcher: Send + Sync {
    /// Fetches the events matching `criteria`.
    async fn fetch(&self, criteria: &FetchCriteria) -> Result<Vec<RawEvent>, FetchError>;

    /// A short name for logging.
    fn name(&self) -> &'static str;
}
