//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SnapshotStore trait.

use crate::crawler::StopReason;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::{RunOutcome, RunRecord, RunStatus, Snapshot};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened snapshot database at {}", path.display());

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored snapshots across all seeds
    pub fn snapshot_count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp {:?}: {}", value, e)))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let status: String = row.get(5)?;
    let stop_reason: Option<String> = row.get(8)?;
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        config_hash: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        status: RunStatus::from_db_string(&status).unwrap_or(RunStatus::Failed),
        pages_visited: row.get::<_, i64>(6)? as u64,
        pages_failed: row.get::<_, i64>(7)? as u64,
        stop_reason: stop_reason.as_deref().and_then(StopReason::from_db_string),
        error_message: row.get(9)?,
    })
}

const RUN_COLUMNS: &str = "id, seed_url, config_hash, started_at, finished_at, status, \
     pages_visited, pages_failed, stop_reason, error_message";

impl SnapshotStore for SqliteStorage {
    // ===== Snapshots =====

    fn save_snapshot(&mut self, snapshot: &Snapshot) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO snapshots (seed_url, aggregated_text, refreshed_at) VALUES (?1, ?2, ?3)",
            params![
                snapshot.seed_url,
                snapshot.aggregated_text,
                snapshot.refreshed_at.to_rfc3339()
            ],
        )?;
        let snapshot_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO snapshot_urls (snapshot_id, position, url) VALUES (?1, ?2, ?3)",
            )?;
            for (position, url) in snapshot.visited_urls.iter().enumerate() {
                stmt.execute(params![snapshot_id, position as i64, url])?;
            }
        }

        let pruned = tx.execute(
            "DELETE FROM snapshots WHERE seed_url = ?1 AND id < ?2",
            params![snapshot.seed_url, snapshot_id],
        )?;

        tx.commit()?;

        tracing::debug!(
            "Saved snapshot {} for {} ({} URLs, pruned {})",
            snapshot_id,
            snapshot.seed_url,
            snapshot.visited_urls.len(),
            pruned
        );
        Ok(snapshot_id)
    }

    fn load_latest_snapshot(&self, seed_url: &str) -> StorageResult<Option<Snapshot>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, aggregated_text, refreshed_at FROM snapshots
                 WHERE seed_url = ?1 ORDER BY id DESC LIMIT 1",
                params![seed_url],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((snapshot_id, aggregated_text, refreshed_at)) = row else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT url FROM snapshot_urls WHERE snapshot_id = ?1 ORDER BY position",
        )?;
        let visited_urls = stmt
            .query_map(params![snapshot_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Snapshot {
            seed_url: seed_url.to_string(),
            aggregated_text,
            visited_urls,
            refreshed_at: parse_timestamp(&refreshed_at)?,
        }))
    }

    // ===== Refresh Runs =====

    fn start_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO refresh_runs (seed_url, config_hash, started_at, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![seed_url, config_hash, now, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, outcome: &RunOutcome) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE refresh_runs
             SET finished_at = ?1, status = ?2, pages_visited = ?3, pages_failed = ?4, stop_reason = ?5
             WHERE id = ?6",
            params![
                now,
                RunStatus::Completed.to_db_string(),
                outcome.pages_visited as i64,
                outcome.pages_failed as i64,
                outcome.stop.to_db_string(),
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE refresh_runs SET finished_at = ?1, status = ?2, error_message = ?3 WHERE id = ?4",
            params![now, RunStatus::Failed.to_db_string(), error, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM refresh_runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM refresh_runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
