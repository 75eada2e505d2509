//! Snapshot File - Atomic JSON Collection Persistence
//!
//! Saves a whole collection to `<name>.json` using atomic writes
//! (write to tmp file, then rename). The file on disk is always either
//! the old or the new version, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info, instrument};

/// One atomically rewritten JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// Path to `<name>.json`.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
}

impl SnapshotFile {
    /// Snapshot file `<name>.json` inside `dir`. The directory must exist.
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
            tmp_path: dir.join(format!("{name}.json.tmp")),
        }
    }

    /// Write `records` atomically (tmp → rename).
    #[instrument(skip(self, records), fields(path = %self.path.display()))]
    pub async fn save<T: Serialize + Sync + ?Sized>(&self, records: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(records).context("Failed to serialize snapshot")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp snapshot file")?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename snapshot file")?;

        debug!(bytes = json.len(), "Snapshot saved");
        Ok(())
    }

    /// Load the snapshot, or `T::default()` if the file does not exist yet.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if !self.path.exists() {
            info!("No snapshot found, starting fresh");
            return Ok(T::default());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read snapshot file")?;

        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse snapshot {}", self.path.display()))
    }

    /// Check that the snapshot (if any) is readable.
    pub async fn is_healthy(&self) -> bool {
        if !self.path.exists() {
            return true; // First run is OK
        }
        fs::metadata(&self.path).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_snapshot_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path(), "accounts");
        let loaded: Vec<String> = file.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path(), "claims");

        file.save(&vec!["a".to_string()]).await.unwrap();
        file.save(&vec!["b".to_string(), "c".to_string()]).await.unwrap();

        let loaded: Vec<String> = file.load().await.unwrap();
        assert_eq!(loaded, vec!["b", "c"]);
        assert!(!dir.path().join("claims.json.tmp").exists());
    }
}
