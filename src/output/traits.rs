//! Export sink traits and types
//!
//! This module defines the interface the crawler hands finished conversations
//! to, and the record it passes.

use crate::conversation::Conversation;
use crate::crawler::{CrawlMode, RunReport};
use crate::storage::StorageError;
use crate::url::ConversationIdentity;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while exporting
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export rejected: {0}")]
    Rejected(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Everything the sink receives for one conversation
#[derive(Debug, Clone)]
pub struct ExportRecord {
    /// Canonical address of the conversation
    pub identity: ConversationIdentity,

    /// Extracted title, turns and scope
    pub conversation: Conversation,

    /// Derived keywords, best first
    pub keywords: Vec<String>,

    /// Tagging keywords that occur in the transcript, in the order given
    pub tags_found: Vec<String>,

    /// Raw page markup, when the sink asked for it
    pub html: Option<String>,
}

impl ExportRecord {
    pub fn turn_count(&self) -> usize {
        self.conversation.turns.len()
    }
}

/// Receives finished conversations
///
/// The coordinator only needs to know whether an export succeeded; a
/// conversation whose export fails is not marked as seen.
#[async_trait]
pub trait ExportSink: Send {
    /// Called once before the first phase
    async fn begin_run(&mut self, _mode: &CrawlMode) -> SinkResult<()> {
        Ok(())
    }

    /// Persists one conversation
    async fn export(&mut self, record: &ExportRecord) -> SinkResult<()>;

    /// Called once after the last phase with the final counters
    async fn finish_run(&mut self, _report: &RunReport) -> SinkResult<()> {
        Ok(())
    }

    /// Whether records should carry the raw page markup
    fn wants_html(&self) -> bool {
        false
    }
}
