//! Storage module for the export manifest
//!
//! This module handles all database operations for the archiver, including:
//! - SQLite database initialization and schema management
//! - Run tracking with final counters
//! - A record of every exported conversation

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a manifest database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents an archive run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub mode: String,
    pub export_dir: Option<String>,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Final counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub attempted: u64,
    pub exported: u64,
    pub skipped: u64,
}

/// Represents one exported conversation in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub identity: String,
    pub title: String,
    pub scope: String,
    pub keywords: Vec<String>,
    pub tags_found: Vec<String>,
    pub turn_count: u32,
    pub sha256: String,
    pub exported_at: String,
}

/// Status of an archive run
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
