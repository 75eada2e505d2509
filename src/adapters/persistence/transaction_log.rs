//! Transaction Log - Append-only JSONL Share Transactions
//!
//! Persists share transactions to `shares.jsonl`. Each line is a
//! self-contained JSON record:
//! - Append-only writes (no read-modify-write)
//! - Line-by-line streaming for analysis
//! - Malformed lines are skipped on load

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::domain::ShareTransaction;

pub struct TransactionLog {
    /// Path to `shares.jsonl`.
    path: PathBuf,
}

impl TransactionLog {
    /// Log file inside `dir`. The directory must exist.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("shares.jsonl"),
        }
    }

    /// Append one transaction and flush.
    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    pub async fn append(&self, transaction: &ShareTransaction) -> Result<()> {
        let mut json =
            serde_json::to_string(transaction).context("Failed to serialize share transaction")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("Failed to open share log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write share transaction")?;

        file.flush().await.context("Failed to flush share log")?;

        Ok(())
    }

    /// Load every transaction in file order.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<ShareTransaction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .context("Failed to read share log")?;

        let mut transactions = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ShareTransaction>(line) {
                Ok(transaction) => transactions.push(transaction),
                Err(e) => {
                    warn!(
                        file = %self.path.display(),
                        error = %e,
                        "Skipping malformed share transaction"
                    );
                }
            }
        }

        info!(count = transactions.len(), "Loaded share transactions");
        Ok(transactions)
    }

    /// Check if the log directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let Some(dir) = self.path.parent() else {
            return false;
        };
        let test_path = dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_append_then_load_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let log = TransactionLog::new(dir.path());

        log.append(&ShareTransaction::single("alice", "AAPL", 2, dec!(3)))
            .await
            .unwrap();
        tokio::fs::write(
            dir.path().join("shares.jsonl"),
            format!(
                "{}\nnot json\n",
                tokio::fs::read_to_string(dir.path().join("shares.jsonl"))
                    .await
                    .unwrap()
                    .trim_end()
            ),
        )
        .await
        .unwrap();
        log.append(&ShareTransaction::single("bob", "MSFT", 1, dec!(100)))
            .await
            .unwrap();

        let loaded = log.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].account, "alice");
        assert_eq!(loaded[1].order[0].ticker_symbol, "MSFT");
        assert!(log.is_healthy().await);
    }
}
