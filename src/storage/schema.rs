//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the site-chat database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Latest crawl output per seed (older rows are pruned on save)
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    aggregated_text TEXT NOT NULL,
    refreshed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_snapshots_seed ON snapshots(seed_url);

-- Visited URLs of a snapshot, in visit order
CREATE TABLE IF NOT EXISTS snapshot_urls (
    snapshot_id INTEGER NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, position)
);

-- History of refresh runs
CREATE TABLE IF NOT EXISTS refresh_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    stop_reason TEXT,
    error_message TEXT
);
"#;

/// Creates all tables and indexes if they do not exist yet
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
