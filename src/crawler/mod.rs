//! Crawler module for traversing a conversation archive
//!
//! This module contains the core traversal logic, including:
//! - Run modes and the per-phase scope partition
//! - Session readiness gates (interactive login, unattended runs)
//! - Per-conversation extraction into export records
//! - Phase sequencing, de-duplication and per-item failure isolation

mod coordinator;
mod exporter;
mod gate;
mod mode;
mod report;

pub use coordinator::Coordinator;
pub use exporter::ExportOrchestrator;
pub use gate::{ImmediateGate, PromptGate, ReadyGate};
pub use mode::CrawlMode;
pub use report::{PhaseReport, RunReport};
