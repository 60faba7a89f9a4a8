//! # Debug Artifacts
//!
//! Optional copies of raw downloads and intermediate data, written for later
//! inspection. Writing an artifact never fails the caller: problems are logged
//! and the pipeline carries on.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: PathBuf,
}

impl DebugArtifacts {
    /// Artifacts will be written under `dir`, which is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes raw bytes to `name` and returns the full path on success.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(name);
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, bytes));
        match result {
            Ok(()) => {
                info!("Saved debug artifact to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to save debug artifact {}: {e}", path.display());
                None
            }
        }
    }

    pub fn write_text(&self, name: &str, text: &str) -> Option<PathBuf> {
        self.write_bytes(name, text.as_bytes())
    }

    /// Writes `value` as indented JSON.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Option<PathBuf> {
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => self.write_bytes(name, &bytes),
            Err(e) => {
                warn!("Failed to serialize debug artifact {name}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = DebugArtifacts::new(tmp.path().join("nested/dir"));
        let path = artifacts
            .write_json("events.json", &serde_json::json!({"a": 1}))
            .expect("artifact should be written");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"a\": 1"));
    }

    #[test]
    fn unwritable_location_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A regular file where the directory should be.
        let artifacts = DebugArtifacts::new(&blocker);
        assert!(artifacts.write_text("note.txt", "hello").is_none());
    }
}
