//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the export manifest.

/// SQL schema for the manifest database
pub const SCHEMA_SQL: &str = r#"
-- Track archive runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    mode TEXT NOT NULL,
    export_dir TEXT,
    status TEXT NOT NULL,
    attempted INTEGER NOT NULL DEFAULT 0,
    exported INTEGER NOT NULL DEFAULT 0,
    skipped INTEGER NOT NULL DEFAULT 0
);

-- Track every exported conversation
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    identity TEXT NOT NULL,
    title TEXT NOT NULL,
    scope TEXT NOT NULL,
    keywords TEXT NOT NULL,
    tags_found TEXT NOT NULL,
    turn_count INTEGER NOT NULL,
    sha256 TEXT NOT NULL,
    exported_at TEXT NOT NULL,
    UNIQUE(run_id, identity)
);

CREATE INDEX IF NOT EXISTS idx_conversations_identity ON conversations(identity);
CREATE INDEX IF NOT EXISTS idx_conversations_scope ON conversations(scope);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
