//! State module for tracking crawl progress
//!
//! This module provides the run-scoped state the crawler carries between
//! phases and items.
//!
//! # Components
//!
//! - `SeenSet`: Conversations already exported in this run
//! - `CrawlPhase`: Where the run is in its phase sequence
//! - `ItemOutcome`: How processing of a single reference ended

mod item_outcome;
mod phase;
mod seen;

// Re-export main types
pub use item_outcome::ItemOutcome;
pub use phase::CrawlPhase;
pub use seen::SeenSet;
