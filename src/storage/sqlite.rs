//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ConversationRecord, RunRecord, RunStatus, RunTotals};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, mode, export_dir, status,
     attempted, exported, skipped";

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
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        mode: row.get(4)?,
        export_dir: row.get(5)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(6)?).unwrap_or(RunStatus::Running),
        totals: RunTotals {
            attempted: row.get::<_, i64>(7)? as u64,
            exported: row.get::<_, i64>(8)? as u64,
            skipped: row.get::<_, i64>(9)? as u64,
        },
    })
}

fn count(conn: &Connection, sql: &str) -> StorageResult<u64> {
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count as u64)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        mode: &str,
        export_dir: Option<&str>,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, mode, export_dir, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                mode,
                export_dir,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, attempted = ?3, exported = ?4,
             skipped = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                totals.attempted as i64,
                totals.exported as i64,
                totals.skipped as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Conversations =====

    fn record_conversation(
        &mut self,
        run_id: i64,
        record: &ConversationRecord,
    ) -> StorageResult<()> {
        let keywords = serde_json::to_string(&record.keywords)?;
        let tags_found = serde_json::to_string(&record.tags_found)?;

        self.conn.execute(
            "INSERT OR IGNORE INTO conversations
             (run_id, identity, title, scope, keywords, tags_found, turn_count, sha256, exported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                run_id,
                record.identity,
                record.title,
                record.scope,
                keywords,
                tags_found,
                record.turn_count,
                record.sha256,
                record.exported_at
            ],
        )?;
        Ok(())
    }

    fn get_run_conversations(&self, run_id: i64) -> StorageResult<Vec<ConversationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT identity, title, scope, keywords, tags_found, turn_count, sha256, exported_at
             FROM conversations WHERE run_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(identity, title, scope, keywords, tags_found, turn_count, sha256, exported_at)| {
                    Ok(ConversationRecord {
                        identity,
                        title,
                        scope,
                        keywords: serde_json::from_str(&keywords)?,
                        tags_found: serde_json::from_str(&tags_found)?,
                        turn_count,
                        sha256,
                        exported_at,
                    })
                },
            )
            .collect()
    }

    // ===== Statistics =====

    fn count_runs(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM runs")
    }

    fn count_conversations(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM conversations")
    }

    fn count_unique_conversations(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(DISTINCT identity) FROM conversations")
    }

    fn count_by_scope(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT scope, COUNT(*) FROM conversations GROUP BY scope
             ORDER BY COUNT(*) DESC, scope ASC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identity: &str, scope: &str) -> ConversationRecord {
        ConversationRecord {
            identity: identity.to_string(),
            title: "Trip planning".to_string(),
            scope: scope.to_string(),
            keywords: vec!["NRW".to_string(), "Dortmund".to_string()],
            tags_found: vec!["OWL".to_string()],
            turn_count: 4,
            sha256: "abc123".to_string(),
            exported_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("hash", "root", Some("out")).unwrap();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.mode, "root");
        assert_eq!(run.export_dir.as_deref(), Some("out"));
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
        assert!(storage.get_latest_run().unwrap().is_none());
    }

    #[test]
    fn test_complete_run_stores_totals() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("hash", "all", None).unwrap();
        let totals = RunTotals {
            attempted: 3,
            exported: 2,
            skipped: 1,
        };
        storage
            .complete_run(run_id, RunStatus::Completed, &totals)
            .unwrap();

        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.totals, totals);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_record_conversation_is_idempotent_per_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("hash", "root", None).unwrap();

        let first = record("https://archive.example.com/c/1", "root");
        storage.record_conversation(run_id, &first).unwrap();
        storage.record_conversation(run_id, &first).unwrap();

        let stored = storage.get_run_conversations(run_id).unwrap();
        assert_eq!(stored, vec![first]);
    }

    #[test]
    fn test_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first_run = storage.create_run("hash", "root", None).unwrap();
        let second_run = storage.create_run("hash", "all", None).unwrap();

        storage
            .record_conversation(first_run, &record("https://archive.example.com/c/1", "root"))
            .unwrap();
        storage
            .record_conversation(second_run, &record("https://archive.example.com/c/1", "root"))
            .unwrap();
        storage
            .record_conversation(
                second_run,
                &record("https://archive.example.com/g/g-p-1-work/c/2", "Work"),
            )
            .unwrap();

        assert_eq!(storage.count_runs().unwrap(), 2);
        assert_eq!(storage.count_conversations().unwrap(), 3);
        assert_eq!(storage.count_unique_conversations().unwrap(), 2);
        assert_eq!(
            storage.count_by_scope().unwrap(),
            vec![("root".to_string(), 2), ("Work".to_string(), 1)]
        );
    }

    #[test]
    fn test_file_database_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("manifest.db");
        let mut storage = SqliteStorage::new(&path).unwrap();
        storage.create_run("hash", "root", None).unwrap();
        assert!(path.exists());
    }
}
