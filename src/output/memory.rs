//! In-memory export sink
//!
//! Used by `--dry-run`, where nothing is written, and by tests that need to
//! inspect exactly what was exported.

use crate::crawler::{CrawlMode, RunReport};
use crate::output::traits::{ExportRecord, ExportSink, SinkError, SinkResult};
use async_trait::async_trait;
use std::collections::HashSet;

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ExportRecord>,
    rejected: HashSet<String>,
    mode: Option<CrawlMode>,
    report: Option<RunReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the sink refuse the conversation with this canonical address
    pub fn reject(mut self, identity: impl Into<String>) -> Self {
        self.rejected.insert(identity.into());
        self
    }

    /// Records accepted so far, in export order
    pub fn records(&self) -> &[ExportRecord] {
        &self.records
    }

    /// Canonical addresses accepted so far, in export order
    pub fn identities(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.identity.to_string())
            .collect()
    }

    pub fn mode(&self) -> Option<&CrawlMode> {
        self.mode.as_ref()
    }

    /// The final report, once the run has finished
    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn begin_run(&mut self, mode: &CrawlMode) -> SinkResult<()> {
        self.mode = Some(mode.clone());
        Ok(())
    }

    async fn export(&mut self, record: &ExportRecord) -> SinkResult<()> {
        if self.rejected.contains(record.identity.as_str()) {
            return Err(SinkError::Rejected(record.identity.to_string()));
        }

        tracing::info!(
            "Captured '{}' ({} turns)",
            record.conversation.title,
            record.turn_count()
        );
        self.records.push(record.clone());
        Ok(())
    }

    async fn finish_run(&mut self, report: &RunReport) -> SinkResult<()> {
        self.report = Some(report.clone());
        Ok(())
    }
}
