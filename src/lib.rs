//! Convo-Archiver: a conversation archive walker
//!
//! This crate drives a document session over a hierarchically organized
//! conversation archive, extracts conversational turns from whichever markup
//! variant is currently live, derives keywords from the transcripts and hands
//! the results to an export sink.

pub mod config;
pub mod conversation;
pub mod crawler;
pub mod document;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Convo-Archiver operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] document::DocumentError),

    #[error("Export error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Timed out after {millis}ms while {action}")]
    Timeout { action: String, millis: u64 },

    #[error("Session gate failed: {0}")]
    Gate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector pattern: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Convo-Archiver operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{Conversation, ConversationTurn, Role, Scope};
pub use crawler::{Coordinator, CrawlMode, PhaseReport, RunReport};
pub use extract::{KeywordExtractor, Resolution, SelectorResolver, TurnClassifier};
pub use state::SeenSet;
pub use url::{normalize_reference, ConversationIdentity, ScopeRule};
