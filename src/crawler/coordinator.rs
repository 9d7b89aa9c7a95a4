//! Crawler coordinator - main archive traversal logic
//!
//! This module contains the run loop that coordinates:
//! - Opening the session and waiting for it to become usable
//! - Discovering named scopes and planning the phase sequence
//! - Entering each scope and collecting its conversation references
//! - Visiting every new reference with per-item failure isolation
//! - Reporting per-phase and per-run counters

use crate::config::Config;
use crate::conversation::Scope;
use crate::crawler::exporter::ExportOrchestrator;
use crate::crawler::gate::ReadyGate;
use crate::crawler::mode::CrawlMode;
use crate::crawler::report::{PhaseReport, RunReport};
use crate::document::{Document, NodeHandle};
use crate::extract::{Resolution, SelectorResolver};
use crate::output::ExportSink;
use crate::state::{CrawlPhase, ItemOutcome, SeenSet};
use crate::url::{normalize_reference, scope_prefix, ConversationIdentity, ScopeRule};
use crate::{ArchiveError, Result};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// How often the sidebar is probed while waiting for it
const SIDEBAR_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Main archive coordinator
///
/// Owns the single document session and the export sink for the duration of
/// a run. Everything happens sequentially: each navigation mutates the one
/// session, so there is never more than one operation in flight.
pub struct Coordinator<D, S> {
    config: Arc<Config>,
    document: D,
    sink: S,
    links: SelectorResolver,
    sidebar: SelectorResolver,
    scopes: SelectorResolver,
    exporter: ExportOrchestrator,
    filter: Vec<String>,
}

impl<D, S> Coordinator<D, S>
where
    D: Document,
    S: ExportSink,
{
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `document` - The document session to drive
    /// * `sink` - Where finished conversations go
    pub fn new(config: Config, document: D, sink: S) -> Self {
        let exporter = ExportOrchestrator::new(&config);
        Self {
            links: SelectorResolver::new(config.selectors.links.clone()),
            sidebar: SelectorResolver::new(config.selectors.sidebar.clone()),
            scopes: SelectorResolver::new(config.selectors.scopes.clone()),
            config: Arc::new(config),
            document,
            sink,
            exporter,
            filter: Vec::new(),
        }
    }

    /// Tagging keywords recorded with each export
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.exporter = self.exporter.with_tags(tags);
        self
    }

    /// Content filter; conversations mentioning none of the terms are skipped
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Gives back the session and the sink
    pub fn into_parts(self) -> (D, S) {
        (self.document, self.sink)
    }

    /// Runs every phase of `mode`
    ///
    /// `seen` is owned by the caller and shared by all phases; identities
    /// already in it are never exported again. Individual items and named
    /// scopes may fail without failing the run; only an unusable session or
    /// sink does.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - Per-phase counters, also for partially failed runs
    /// * `Err(ArchiveError)` - The session or sink could not be started
    pub async fn run(
        &mut self,
        mode: &CrawlMode,
        gate: &mut dyn ReadyGate,
        seen: &mut SeenSet,
    ) -> Result<RunReport> {
        tracing::info!("Starting archive run: {}", mode);
        let started = Instant::now();

        self.open_session().await?;

        gate.wait_ready("Log in if needed and wait until the conversation list is visible.")
            .await?;

        tracing::info!("Waiting for the conversation list...");
        if !self.wait_for_sidebar().await {
            tracing::warn!("Conversation list not detected automatically");
            gate.wait_ready("Make the conversation list visible.").await?;
        }

        self.sink.begin_run(mode).await?;

        let marker = self.config.selectors.scope_marker.clone();
        let named_scopes = match mode {
            CrawlMode::RootOnly => Vec::new(),
            CrawlMode::Project(name) => vec![name.clone()],
            CrawlMode::AllScopes => self.discover_scopes().await,
        };

        let mut report = RunReport::new(mode.label());
        let mut phase = CrawlPhase::Idle;

        if mode.includes_root() {
            advance(&mut phase, CrawlPhase::Root);
            let rule = mode.root_rule(&marker, named_scopes.len());
            let root = self.run_phase(Scope::Root, rule, seen).await;
            report.phases.push(root);
        }

        for (index, name) in named_scopes.iter().enumerate() {
            advance(&mut phase, CrawlPhase::named(index, name.as_str()));
            let scope = Scope::Named(name.clone());

            let Some(entered) = self.enter_scope(name).await else {
                tracing::error!("Project '{}' not found, skipping its phase", name);
                report.phases.push(PhaseReport::navigation_failed(scope));
                continue;
            };

            let mut rule = ScopeRule::named_only(name.as_str(), marker.as_str());
            if let Some(prefix) = scope_prefix(&entered, &marker) {
                rule = rule.within(prefix);
            }
            let named = self.run_phase(scope, rule, seen).await;
            report.phases.push(named);
        }

        advance(&mut phase, CrawlPhase::Done);
        report.seen = seen.len();

        if let Err(e) = self.sink.finish_run(&report).await {
            tracing::error!("Failed to finalize export: {}", e);
        }

        tracing::info!(
            "Run finished in {:?}: {} attempted, {} exported, {} skipped ({} failed)",
            started.elapsed(),
            report.attempted(),
            report.exported(),
            report.skipped(),
            report.failed()
        );

        Ok(report)
    }

    /// Loads the start address within the navigation timeout
    async fn open_session(&mut self) -> Result<()> {
        let start_url = self.config.session.start_url.clone();
        self.navigate_within(&start_url, self.config.session.navigation_timeout())
            .await
    }

    async fn navigate_within(&mut self, url: &str, limit: Duration) -> Result<()> {
        match timeout(limit, self.document.navigate(url)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ArchiveError::Timeout {
                action: format!("loading {}", url),
                millis: limit.as_millis() as u64,
            }),
        }
    }

    /// Polls the sidebar patterns until one matches or the timeout elapses
    async fn wait_for_sidebar(&self) -> bool {
        let deadline = Instant::now() + self.config.session.sidebar_timeout();

        loop {
            if let Some(outcome) = self.sidebar.resolve(&self.document).await.outcome() {
                tracing::info!(
                    "Conversation list detected via '{}' ({} nodes)",
                    outcome.pattern,
                    outcome.match_count
                );
                return true;
            }

            if Instant::now() + SIDEBAR_POLL_INTERVAL > deadline {
                return false;
            }
            sleep(SIDEBAR_POLL_INTERVAL).await;
        }
    }

    /// Lists named scopes on the navigation surface, once, by display name
    async fn discover_scopes(&self) -> Vec<String> {
        let nodes = match self.scopes.resolve(&self.document).await {
            Resolution::Matched { pattern, nodes } => {
                tracing::info!("Project selector '{}' matched {} nodes", pattern, nodes.len());
                nodes
            }
            Resolution::NoMatch => {
                tracing::info!("No projects found");
                return Vec::new();
            }
        };

        let mut names: IndexSet<String> = IndexSet::new();
        for node in &nodes {
            match self.document.text(node).await {
                Ok(text) => {
                    if let Some(name) = text.lines().next().map(str::trim) {
                        if !name.is_empty() {
                            names.insert(name.to_string());
                        }
                    }
                }
                Err(e) => tracing::warn!("Skipping project entry {}: {}", node.index, e),
            }
        }

        tracing::info!("Found {} projects", names.len());
        names.into_iter().collect()
    }

    /// Navigates into a named scope and returns the address it landed on
    ///
    /// Starts from the start address. Entries whose first text line equals
    /// `name` (ignoring case) are tried first; entries merely containing it
    /// only when no pattern has an exact entry. After a click the address
    /// must be the entry's link target, or at least differ from the start
    /// address when the entry has none. Returns `None` if no entry gets there.
    async fn enter_scope(&mut self, name: &str) -> Option<String> {
        tracing::info!("Navigating to project '{}'", name);

        if !self.return_to_start().await {
            return None;
        }

        let url_before = self.document.current_url();
        let patterns = self.scopes.patterns().to_vec();
        let mut exact_found = false;

        for exact in [true, false] {
            if !exact && exact_found {
                break;
            }

            for pattern in &patterns {
                let Some((node, target)) = self.find_entry(pattern, name, exact).await else {
                    continue;
                };
                exact_found |= exact;

                tracing::debug!("Project entry found with selector '{}'", pattern);
                if let Err(e) = self.document.click(&node).await {
                    tracing::warn!("Error with selector '{}': {}", pattern, e);
                    continue;
                }

                let settle = self.config.session.scope_settle();
                if !settle.is_zero() {
                    sleep(settle).await;
                }

                let url_after = self.document.current_url();
                let arrived = match &target {
                    Some(target) => same_address(target, &url_before, &url_after),
                    None => url_after != url_before,
                };
                if arrived {
                    tracing::info!("Entered project '{}' at {}", name, url_after);
                    return Some(url_after);
                }

                tracing::debug!(
                    "Selector '{}' led to {} instead of the project, trying next",
                    pattern,
                    url_after
                );
                if url_after != url_before && !self.return_to_start().await {
                    return None;
                }
            }
        }

        None
    }

    async fn return_to_start(&mut self) -> bool {
        let start_url = self.config.session.start_url.clone();
        match self
            .navigate_within(&start_url, self.config.session.navigation_timeout())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not return to {}: {}", start_url, e);
                false
            }
        }
    }

    /// First entry of `pattern` naming `name`, with its link target
    ///
    /// `exact` compares the trimmed first text line, otherwise any text
    /// containing `name` matches. Both ignore case.
    async fn find_entry(
        &self,
        pattern: &str,
        name: &str,
        exact: bool,
    ) -> Option<(NodeHandle, Option<String>)> {
        let nodes = match self.document.query(pattern).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!("Error with selector '{}': {}", pattern, e);
                return None;
            }
        };

        let needle = name.trim().to_lowercase();
        for node in nodes {
            let text = match self.document.text(&node).await {
                Ok(text) => text.to_lowercase(),
                Err(e) => {
                    tracing::debug!("Skipping entry {} of '{}': {}", node.index, pattern, e);
                    continue;
                }
            };

            let matched = if exact {
                text.lines().next().map(str::trim) == Some(needle.as_str())
            } else {
                text.contains(&needle)
            };
            if !matched {
                continue;
            }

            let target = self.document.attribute(&node, "href").await.ok().flatten();
            return Some((node, target));
        }

        None
    }

    /// Collects the phase's references before any navigation happens
    ///
    /// Node handles die with the next navigation, so every `href` is read up
    /// front and resolved against the current address. The result is
    /// partitioned by `rule` and de-duplicated by identity, keeping first-seen
    /// order.
    async fn collect_references(&self, rule: &ScopeRule) -> Vec<ConversationIdentity> {
        let nodes = match self.links.resolve(&self.document).await {
            Resolution::Matched { pattern, nodes } => {
                tracing::info!("Link selector '{}' matched {} nodes", pattern, nodes.len());
                nodes
            }
            Resolution::NoMatch => {
                tracing::warn!("No conversation links found");
                return Vec::new();
            }
        };

        let base = self.document.current_url();
        let mut references = Vec::with_capacity(nodes.len());
        for node in &nodes {
            match self.document.attribute(node, "href").await {
                Ok(Some(href)) => references.push(href),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping link {}: {}", node.index, e),
            }
        }

        let total = references.len();
        let references = rule.partition(references);
        tracing::info!("{} of {} links kept by rule: {}", references.len(), total, rule);

        let mut identities: IndexMap<ConversationIdentity, ()> = IndexMap::new();
        for reference in references {
            match normalize_reference(&reference, &base) {
                Ok(identity) => {
                    identities.entry(identity).or_insert(());
                }
                Err(e) => tracing::debug!("Ignoring reference '{}': {}", reference, e),
            }
        }

        identities.into_keys().collect()
    }

    /// Runs one traversal phase over the current scope
    async fn run_phase(&mut self, scope: Scope, rule: ScopeRule, seen: &mut SeenSet) -> PhaseReport {
        tracing::info!("Phase {}: collecting conversations", scope);

        let mut report = PhaseReport::new(scope.clone());
        let identities = self.collect_references(&rule).await;
        report.discovered = identities.len();

        let item_timeout = self.config.session.item_timeout();
        let total = identities.len();

        for (i, identity) in identities.into_iter().enumerate() {
            if seen.contains(&identity) {
                tracing::debug!("Already exported {}", identity);
                report.record(ItemOutcome::AlreadySeen);
                continue;
            }

            tracing::info!("[{}/{}] Opening {}", i + 1, total, identity);

            let outcome = match timeout(item_timeout, self.process_item(&identity, &scope)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(ArchiveError::Document(e))) if e.is_transient() => {
                    tracing::warn!("Skipping {} (may succeed on a later run): {}", identity, e);
                    ItemOutcome::Failed
                }
                Ok(Err(e)) => {
                    tracing::error!("Skipping {}: {}", identity, e);
                    ItemOutcome::Failed
                }
                Err(_) => {
                    tracing::warn!(
                        "Skipping {}: timed out after {}ms",
                        identity,
                        item_timeout.as_millis()
                    );
                    ItemOutcome::TimedOut
                }
            };

            if outcome.is_success() {
                seen.insert(identity);
            }
            report.record(outcome);
        }

        tracing::info!(
            "Phase {} done: {} attempted, {} exported, {} skipped",
            scope,
            report.attempted,
            report.exported,
            report.skipped
        );

        report
    }

    /// Navigates to one conversation, extracts it and hands it to the sink
    async fn process_item(
        &mut self,
        identity: &ConversationIdentity,
        scope: &Scope,
    ) -> Result<ItemOutcome> {
        self.document.navigate(identity.as_str()).await?;

        let Some(conversation) = self.exporter.capture(&self.document, scope).await? else {
            tracing::warn!("No content in {}, skipping", identity);
            return Ok(ItemOutcome::NoContent);
        };

        if !self.filter.is_empty() && !conversation.mentions_any(&self.filter) {
            tracing::info!("'{}' does not match the content filter", conversation.title);
            return Ok(ItemOutcome::Filtered);
        }

        let html = if self.sink.wants_html() {
            Some(self.document.content().await?)
        } else {
            None
        };

        let record = self
            .exporter
            .build_record(identity.clone(), conversation, html);
        self.sink.export(&record).await?;

        Ok(ItemOutcome::Exported)
    }
}

/// Returns true if `address` is where the link `target`, found on `base`, leads
fn same_address(target: &str, base: &str, address: &str) -> bool {
    match (
        normalize_reference(target, base),
        normalize_reference(address, address),
    ) {
        (Ok(target), Ok(address)) => target == address,
        _ => false,
    }
}

fn advance(phase: &mut CrawlPhase, next: CrawlPhase) {
    debug_assert!(
        phase.can_transition_to(&next),
        "invalid phase transition {} -> {}",
        phase,
        next
    );
    tracing::debug!("Phase {} -> {}", phase, next);
    *phase = next;
}
