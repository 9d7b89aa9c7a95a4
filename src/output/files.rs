//! File-based export sink
//!
//! Layout of one export directory:
//!
//! ```text
//! convo_export[_project_<slug>][_kw_<slugs>]_<YYYYmmdd_HHMMSS>/
//!   export_info.json
//!   summary.md
//!   markdown/<title>-<timestamp>.md
//!   metadata/<title>-<timestamp>.json
//!   raw_html/<title>-<timestamp>.html
//! ```

use crate::config::OutputConfig;
use crate::conversation::Scope;
use crate::crawler::{CrawlMode, RunReport};
use crate::output::markdown::{format_conversation, format_markdown_summary};
use crate::output::traits::{ExportRecord, ExportSink, SinkResult};
use crate::storage::{ConversationRecord, RunStatus, SqliteStorage, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const MAX_SLUG_CHARS: usize = 120;
const MAX_TAG_SLUGS: usize = 3;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^-\w]").expect("valid regex"));

/// Turns arbitrary text into a file name component
///
/// Whitespace runs become `-`, everything but word characters and `-` is
/// dropped, the result is lowercased and cut to 120 characters. Empty input
/// yields `chat`.
pub fn slug(text: &str) -> String {
    let dashed = WHITESPACE.replace_all(text.trim(), "-");
    let cleaned = NON_WORD.replace_all(&dashed, "");
    let slug: String = cleaned.to_lowercase().chars().take(MAX_SLUG_CHARS).collect();

    if slug.is_empty() {
        "chat".to_string()
    } else {
        slug
    }
}

/// Name of the per-run export directory
pub fn export_dir_name(mode: &CrawlMode, tags: &[String], started: &DateTime<Local>) -> String {
    let mut parts = vec!["convo_export".to_string()];

    if let CrawlMode::Project(name) = mode {
        parts.push(format!("project_{}", slug(name)));
    }

    if !tags.is_empty() {
        let tag_slugs = tags
            .iter()
            .take(MAX_TAG_SLUGS)
            .map(|tag| slug(tag))
            .collect::<Vec<_>>()
            .join("_");
        parts.push(format!("kw_{}", tag_slugs));
    }

    parts.push(started.format("%Y%m%d_%H%M%S").to_string());
    parts.join("_")
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Serialize)]
struct ExportInfo<'a> {
    export_timestamp: String,
    export_tool: &'static str,
    tool_version: &'static str,
    system: &'static str,
    architecture: &'static str,
    mode: String,
    config_hash: &'a str,
}

#[derive(Debug, Serialize)]
struct ConversationMetadata<'a> {
    export_timestamp: String,
    chat_timestamp: &'a str,
    chat_url: &'a str,
    chat_title: &'a str,
    project: Option<&'a str>,
    keywords: &'a [String],
    keywords_found: &'a [String],
    sha256_markdown: &'a str,
    turn_count: usize,
}

/// Sink writing Markdown, JSON metadata and raw HTML below one directory
pub struct FileSink {
    root: PathBuf,
    write_markdown: bool,
    write_metadata: bool,
    write_html: bool,
    config_hash: String,
    manifest: Option<SqliteStorage>,
    run_id: Option<i64>,
}

impl FileSink {
    /// Creates a sink writing below `root`
    ///
    /// Nothing touches the filesystem until [`ExportSink::begin_run`].
    pub fn new(root: impl Into<PathBuf>, output: &OutputConfig, config_hash: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            write_markdown: output.write_markdown,
            write_metadata: output.write_metadata,
            write_html: output.write_html,
            config_hash: config_hash.into(),
            manifest: None,
            run_id: None,
        }
    }

    /// Records runs and conversations in a manifest database as well
    pub fn with_manifest(mut self, manifest: SqliteStorage) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest run ID, once the run has begun
    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    /// The manifest, if one is attached
    pub fn manifest(&self) -> Option<&SqliteStorage> {
        self.manifest.as_ref()
    }

    fn markdown_dir(&self) -> PathBuf {
        self.root.join("markdown")
    }

    fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    fn html_dir(&self) -> PathBuf {
        self.root.join("raw_html")
    }

    /// File stem not yet used by any output of this run
    fn unique_stem(&self, title: &str, timestamp: &str) -> String {
        let base = format!("{}-{}", slug(title), timestamp);
        let mut stem = base.clone();
        let mut n = 2;

        while self.markdown_dir().join(format!("{}.md", stem)).exists()
            || self.metadata_dir().join(format!("{}.json", stem)).exists()
            || self.html_dir().join(format!("{}.html", stem)).exists()
        {
            stem = format!("{}-{}", base, n);
            n += 1;
        }

        stem
    }
}

#[async_trait]
impl ExportSink for FileSink {
    async fn begin_run(&mut self, mode: &CrawlMode) -> SinkResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        if self.write_markdown {
            tokio::fs::create_dir_all(self.markdown_dir()).await?;
        }
        if self.write_metadata {
            tokio::fs::create_dir_all(self.metadata_dir()).await?;
        }
        if self.write_html {
            tokio::fs::create_dir_all(self.html_dir()).await?;
        }

        let info = ExportInfo {
            export_timestamp: Local::now().to_rfc3339(),
            export_tool: env!("CARGO_PKG_NAME"),
            tool_version: env!("CARGO_PKG_VERSION"),
            system: std::env::consts::OS,
            architecture: std::env::consts::ARCH,
            mode: mode.label(),
            config_hash: &self.config_hash,
        };
        let info = serde_json::to_string_pretty(&info)?;
        tokio::fs::write(self.root.join("export_info.json"), info).await?;

        let root = self.root.display().to_string();
        if let Some(manifest) = self.manifest.as_mut() {
            let run_id = manifest.create_run(&self.config_hash, &mode.label(), Some(&root))?;
            tracing::info!("Recording run {} in the manifest", run_id);
            self.run_id = Some(run_id);
        }

        tracing::info!("Export directory: {}", self.root.display());
        Ok(())
    }

    async fn export(&mut self, record: &ExportRecord) -> SinkResult<()> {
        let conversation = &record.conversation;
        let timestamp = Local::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let stem = self.unique_stem(&conversation.title, &timestamp);

        let markdown = format_conversation(conversation);
        let sha256 = sha256_hex(&markdown);

        if self.write_markdown {
            let path = self.markdown_dir().join(format!("{}.md", stem));
            tokio::fs::write(&path, &markdown).await?;
            tracing::debug!("Markdown: {}", path.display());
        }

        if self.write_metadata {
            let metadata = ConversationMetadata {
                export_timestamp: Local::now().to_rfc3339(),
                chat_timestamp: &timestamp,
                chat_url: record.identity.as_str(),
                chat_title: &conversation.title,
                project: conversation.scope.name(),
                keywords: &record.keywords,
                keywords_found: &record.tags_found,
                sha256_markdown: &sha256,
                turn_count: record.turn_count(),
            };
            let path = self.metadata_dir().join(format!("{}.json", stem));
            tokio::fs::write(&path, serde_json::to_string_pretty(&metadata)?).await?;
            tracing::debug!("Metadata: {}", path.display());
        }

        if self.write_html {
            if let Some(html) = &record.html {
                let path = self.html_dir().join(format!("{}.html", stem));
                tokio::fs::write(&path, html).await?;
                tracing::debug!("HTML: {}", path.display());
            }
        }

        if let (Some(manifest), Some(run_id)) = (self.manifest.as_mut(), self.run_id) {
            let scope = match &conversation.scope {
                Scope::Root => "root".to_string(),
                Scope::Named(name) => name.clone(),
            };
            manifest.record_conversation(
                run_id,
                &ConversationRecord {
                    identity: record.identity.to_string(),
                    title: conversation.title.clone(),
                    scope,
                    keywords: record.keywords.clone(),
                    tags_found: record.tags_found.clone(),
                    turn_count: record.turn_count() as u32,
                    sha256,
                    exported_at: Utc::now().to_rfc3339(),
                },
            )?;
        }

        tracing::info!("Exported '{}' as {}", conversation.title, stem);
        Ok(())
    }

    async fn finish_run(&mut self, report: &RunReport) -> SinkResult<()> {
        let summary = format_markdown_summary(report);
        tokio::fs::write(self.root.join("summary.md"), summary).await?;

        if let (Some(manifest), Some(run_id)) = (self.manifest.as_mut(), self.run_id) {
            manifest.complete_run(run_id, RunStatus::Completed, &report.totals())?;
        }

        Ok(())
    }

    fn wants_html(&self) -> bool {
        self.write_html
    }
}
