//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot storage backends and
//! associated error types.

use crate::storage::{RunOutcome, RunRecord, Snapshot};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the latest crawl output and the refresh history
///
/// Writers must make a snapshot visible all at once: a reader never observes
/// a snapshot whose URL list is only partly written.
pub trait SnapshotStore {
    // ===== Snapshots =====

    /// Atomically stores a snapshot, replacing older ones for the same seed
    ///
    /// # Returns
    ///
    /// The ID of the stored snapshot
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> StorageResult<i64>;

    /// Loads the most recent snapshot for a seed URL
    fn load_latest_snapshot(&self, seed_url: &str) -> StorageResult<Option<Snapshot>>;

    // ===== Refresh Runs =====

    /// Records the start of a refresh run
    fn start_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with the crawl's outcome
    fn finish_run(&mut self, run_id: i64, outcome: &RunOutcome) -> StorageResult<()>;

    /// Marks a run failed with an error message
    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Most recent runs first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
