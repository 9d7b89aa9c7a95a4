//! Per-conversation extraction
//!
//! Sequences turn resolution, classification and keyword derivation for the
//! page the document currently shows, and assembles the record the export
//! sink receives.

use crate::config::Config;
use crate::conversation::{Conversation, Scope};
use crate::document::Document;
use crate::extract::{KeywordExtractor, Resolution, SelectorResolver, TurnClassifier};
use crate::output::ExportRecord;
use crate::url::ConversationIdentity;
use crate::Result;
use std::time::Duration;

/// Turns the currently loaded conversation page into an export record
#[derive(Debug, Clone)]
pub struct ExportOrchestrator {
    turns: SelectorResolver,
    classifier: TurnClassifier,
    keywords: KeywordExtractor,
    max_keywords: usize,
    tags: Vec<String>,
    settle: Duration,
}

impl ExportOrchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            turns: SelectorResolver::new(config.selectors.turns.clone()),
            classifier: TurnClassifier::new(
                config.selectors.role_attribute.clone(),
                config.selectors.class_attribute.clone(),
            ),
            keywords: KeywordExtractor::new(),
            max_keywords: config.keywords.max_keywords,
            tags: Vec::new(),
            settle: config.session.settle(),
        }
    }

    /// Tagging keywords looked up in every transcript
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Extracts the conversation shown by the document
    ///
    /// Returns `Ok(None)` when no turn selector matches or every matched node
    /// is empty; the caller treats that as "no content".
    pub async fn capture<D>(&self, document: &D, scope: &Scope) -> Result<Option<Conversation>>
    where
        D: Document + ?Sized,
    {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let title = document.title().await?;

        let nodes = match self.turns.resolve(document).await {
            Resolution::Matched { pattern, nodes } => {
                tracing::info!("Turn selector '{}' matched {} nodes", pattern, nodes.len());
                nodes
            }
            Resolution::NoMatch => {
                tracing::warn!("No turn selector matched on {}", document.current_url());
                return Ok(None);
            }
        };

        let turns = self.classifier.classify(document, &nodes).await;
        if turns.is_empty() {
            tracing::warn!("No content recognized in '{}'", title);
            return Ok(None);
        }

        Ok(Some(Conversation::new(title, turns, scope.clone())))
    }

    /// Derives keywords and found tags and assembles the export record
    pub fn build_record(
        &self,
        identity: ConversationIdentity,
        conversation: Conversation,
        html: Option<String>,
    ) -> ExportRecord {
        let text = conversation.full_text();
        let keywords = self.keywords.extract(&text, self.max_keywords);
        let tags_found = conversation.mentioned_terms(&self.tags);

        if !tags_found.is_empty() {
            tracing::info!("Keywords found: {}", tags_found.join(", "));
        }

        ExportRecord {
            identity,
            conversation,
            keywords,
            tags_found,
            html,
        }
    }
}
