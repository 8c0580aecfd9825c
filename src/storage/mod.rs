//! Storage module for persisting crawl snapshots
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Atomic snapshot writes (`{aggregated_text, visited_urls, refreshed_at}`)
//! - Refresh run history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use crate::crawler::{CrawlResult, StopReason};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, StorageError> {
    SqliteStorage::new(path)
}

/// The persisted form of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub seed_url: String,
    pub aggregated_text: String,
    pub visited_urls: Vec<String>,
    pub refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn from_crawl(result: &CrawlResult) -> Self {
        Self {
            seed_url: result.seed.clone(),
            aggregated_text: result.aggregated_text.clone(),
            visited_urls: result.visited.clone(),
            refreshed_at: result.finished_at,
        }
    }

    pub fn into_crawl_result(self) -> CrawlResult {
        CrawlResult::restored(
            self.seed_url,
            self.aggregated_text,
            self.visited_urls,
            self.refreshed_at,
        )
    }

    /// True if the snapshot is younger than `max_age` (`None` = any age)
    pub fn is_fresh(&self, max_age: Option<chrono::Duration>) -> bool {
        match max_age {
            Some(max_age) => Utc::now() - self.refreshed_at <= max_age,
            None => true,
        }
    }
}

/// What a finished refresh run reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub stop: StopReason,
}

impl RunOutcome {
    pub fn from_crawl(result: &CrawlResult) -> Self {
        Self {
            pages_visited: result.pages_visited(),
            pages_failed: result.failures.len(),
            stop: result.stop,
        }
    }
}

/// Represents a refresh run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: RunStatus,
    pub pages_visited: u64,
    pub pages_failed: u64,
    pub stop_reason: Option<StopReason>,
    pub error_message: Option<String>,
}

/// Status of a refresh run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let parsed = RunStatus::from_db_string(status.to_db_string());
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }

    #[test]
    fn test_snapshot_freshness() {
        let mut snapshot = Snapshot {
            seed_url: "https://example.gov/".to_string(),
            aggregated_text: String::new(),
            visited_urls: vec![],
            refreshed_at: Utc::now() - chrono::Duration::days(40),
        };
        assert!(!snapshot.is_fresh(Some(chrono::Duration::days(30))));
        assert!(snapshot.is_fresh(None));

        snapshot.refreshed_at = Utc::now() - chrono::Duration::days(2);
        assert!(snapshot.is_fresh(Some(chrono::Duration::days(30))));
    }

    #[test]
    fn test_snapshot_crawl_conversion() {
        let snapshot = Snapshot {
            seed_url: "https://example.gov/".to_string(),
            aggregated_text: "\n\nContent from https://example.gov/:\nhi".to_string(),
            visited_urls: vec!["https://example.gov/".to_string()],
            refreshed_at: Utc::now(),
        };
        let result = snapshot.clone().into_crawl_result();
        assert_eq!(result.stop, StopReason::Restored);
        assert_eq!(result.visited, snapshot.visited_urls);
        assert_eq!(Snapshot::from_crawl(&result), snapshot);
    }
}
