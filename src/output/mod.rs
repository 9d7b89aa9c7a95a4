//! Output module for exporting conversations and reporting runs
//!
//! This module handles:
//! - The export sink interface the crawler hands conversations to
//! - Writing transcripts, metadata and raw markup to an export directory
//! - Rendering run summaries and manifest statistics

mod files;
mod markdown;
mod memory;
pub mod stats;
mod traits;

pub use files::{export_dir_name, slug, FileSink};
pub use markdown::{format_conversation, format_markdown_summary, generate_markdown_summary};
pub use memory::MemorySink;
pub use stats::{load_statistics, print_statistics, ManifestStatistics};
pub use traits::{ExportRecord, ExportSink, SinkError, SinkResult};
