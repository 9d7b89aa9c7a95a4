//! Storage traits and error types
//!
//! This module defines the trait interface for manifest backends and
//! associated error types.

use crate::storage::{ConversationRecord, RunRecord, RunStatus, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for manifest backend implementations
///
/// The manifest is a record of what each run exported. It is written during a
/// run and read back by `--stats`; the crawler never consults it to decide
/// what to visit.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `mode` - Traversal mode label
    /// * `export_dir` - Directory the run writes into, if any
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        config_hash: &str,
        mode: &str,
        export_dir: Option<&str>,
    ) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as finished with its final status and counters
    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()>;

    // ===== Conversations =====

    /// Records one exported conversation
    ///
    /// Recording the same identity twice within a run is a no-op.
    fn record_conversation(&mut self, run_id: i64, record: &ConversationRecord)
        -> StorageResult<()>;

    /// Gets the conversations exported by a run, in export order
    fn get_run_conversations(&self, run_id: i64) -> StorageResult<Vec<ConversationRecord>>;

    // ===== Statistics =====

    /// Counts all runs
    fn count_runs(&self) -> StorageResult<u64>;

    /// Counts all exported conversation rows across runs
    fn count_conversations(&self) -> StorageResult<u64>;

    /// Counts distinct conversation identities across runs
    fn count_unique_conversations(&self) -> StorageResult<u64>;

    /// Gets exported conversation counts per scope label, largest first
    fn count_by_scope(&self) -> StorageResult<Vec<(String, u64)>>;
}
