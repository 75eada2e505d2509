//! Persistence Adapters - In-memory and File-backed Storage
//!
//! Implements the repository ports with a single record store that can
//! run purely in memory or persist to atomic JSON snapshots plus an
//! append-only JSONL share log. No database dependency.

pub mod snapshot;
pub mod store;
pub mod transaction_log;

pub use snapshot::SnapshotFile;
pub use store::RecordStore;
pub use transaction_log::TransactionLog;
