//! Statistics generation from the export manifest
//!
//! This module provides functionality for extracting and displaying
//! manifest statistics for `--stats`.

use crate::storage::{RunRecord, Storage, StorageResult};

/// Manifest statistics summary
#[derive(Debug, Clone)]
pub struct ManifestStatistics {
    /// Number of recorded runs
    pub total_runs: u64,

    /// Exported conversation rows across all runs
    pub total_exports: u64,

    /// Distinct conversation identities across all runs
    pub unique_conversations: u64,

    /// Exports per scope label, largest first
    pub exports_by_scope: Vec<(String, u64)>,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ManifestStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<ManifestStatistics> {
    Ok(ManifestStatistics {
        total_runs: storage.count_runs()?,
        total_exports: storage.count_conversations()?,
        unique_conversations: storage.count_unique_conversations()?,
        exports_by_scope: storage.count_by_scope()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ManifestStatistics) {
    println!("=== Export Manifest Statistics ===\n");

    println!("Overview:");
    println!("  Runs recorded: {}", stats.total_runs);
    println!("  Conversations exported: {}", stats.total_exports);
    println!("  Unique conversations: {}", stats.unique_conversations);
    println!();

    if !stats.exports_by_scope.is_empty() {
        println!("Exports by Scope:");
        for (scope, count) in &stats.exports_by_scope {
            let percentage = if stats.total_exports > 0 {
                (*count as f64 / stats.total_exports as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", scope, count, percentage);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Mode: {}", run.mode);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        if let Some(dir) = &run.export_dir {
            println!("  Directory: {}", dir);
        }
        println!(
            "  Attempted: {}, exported: {}, skipped: {}",
            run.totals.attempted, run.totals.exported, run.totals.skipped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ConversationRecord, SqliteStorage};

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("hash", "root", None).unwrap();
        storage
            .record_conversation(
                run_id,
                &ConversationRecord {
                    identity: "https://archive.example.com/c/1".to_string(),
                    title: "One".to_string(),
                    scope: "root".to_string(),
                    keywords: vec![],
                    tags_found: vec![],
                    turn_count: 2,
                    sha256: "00".to_string(),
                    exported_at: "2024-01-01T00:00:00Z".to_string(),
                },
            )
            .unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_runs, 1);
        assert_eq!(stats.total_exports, 1);
        assert_eq!(stats.unique_conversations, 1);
        assert_eq!(stats.exports_by_scope, vec![("root".to_string(), 1)]);
        assert_eq!(stats.latest_run.unwrap().id, run_id);
    }

    #[test]
    fn test_empty_manifest() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_runs, 0);
        assert!(stats.exports_by_scope.is_empty());
        assert!(stats.latest_run.is_none());
    }
}
