//! Selector resolution with an ordered fallback chain

use crate::document::{Document, NodeHandle};

/// Diagnostic record of which pattern matched and how many nodes it yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOutcome {
    pub pattern: String,
    pub match_count: usize,
}

/// Result of probing a document with an ordered pattern list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The first pattern with at least one match, and its nodes
    Matched {
        pattern: String,
        nodes: Vec<NodeHandle>,
    },
    /// Every pattern matched zero nodes
    NoMatch,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn outcome(&self) -> Option<SelectorOutcome> {
        match self {
            Self::Matched { pattern, nodes } => Some(SelectorOutcome {
                pattern: pattern.clone(),
                match_count: nodes.len(),
            }),
            Self::NoMatch => None,
        }
    }

    /// The matched nodes, empty on `NoMatch`
    pub fn into_nodes(self) -> Vec<NodeHandle> {
        match self {
            Self::Matched { nodes, .. } => nodes,
            Self::NoMatch => Vec::new(),
        }
    }
}

/// Resolves which of several markup variants is currently live
///
/// Patterns are tried strictly in order and the first one yielding a
/// non-empty match wins. A pattern whose query fails counts as zero matches.
#[derive(Debug, Clone)]
pub struct SelectorResolver {
    patterns: Vec<String>,
}

impl SelectorResolver {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Probes the document and returns the first non-empty match
    pub async fn resolve<D>(&self, document: &D) -> Resolution
    where
        D: Document + ?Sized,
    {
        for pattern in &self.patterns {
            match document.query(pattern).await {
                Ok(nodes) if !nodes.is_empty() => {
                    tracing::debug!("Selector '{}' matched {} nodes", pattern, nodes.len());
                    return Resolution::Matched {
                        pattern: pattern.clone(),
                        nodes,
                    };
                }
                Ok(_) => {
                    tracing::trace!("Selector '{}' matched nothing", pattern);
                }
                Err(e) => {
                    tracing::warn!("Selector '{}' failed: {}", pattern, e);
                }
            }
        }

        Resolution::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SnapshotDocument;

    async fn document(html: &str) -> SnapshotDocument {
        let mut document = SnapshotDocument::new()
            .with_page("https://archive.example.com/c/1", html)
            .unwrap();
        document
            .navigate("https://archive.example.com/c/1")
            .await
            .unwrap();
        document
    }

    fn resolver(patterns: &[&str]) -> SelectorResolver {
        SelectorResolver::new(patterns.iter().map(|p| p.to_string()).collect())
    }

    #[tokio::test]
    async fn test_first_non_empty_pattern_wins() {
        let document = document(
            r#"<main><article>a</article><article>b</article><div data-message-author-role="user">c</div></main>"#,
        )
        .await;
        let resolution = resolver(&[
            r#"main [data-testid="conversation-turn"]"#,
            "main article",
            "main [data-message-author-role]",
        ])
        .resolve(&document)
        .await;

        assert_eq!(
            resolution.outcome(),
            Some(SelectorOutcome {
                pattern: "main article".to_string(),
                match_count: 2,
            })
        );
    }

    #[tokio::test]
    async fn test_earlier_pattern_preferred_even_when_later_matches_more() {
        let document = document(r#"<main><article>a</article><p>1</p><p>2</p><p>3</p></main>"#).await;
        let resolution = resolver(&["main article", "main p"]).resolve(&document).await;
        assert_eq!(resolution.outcome().unwrap().match_count, 1);
    }

    #[tokio::test]
    async fn test_no_match_when_every_pattern_is_empty() {
        let document = document("<main></main>").await;
        let resolution = resolver(&["main article", "main .turn"]).resolve(&document).await;
        assert_eq!(resolution, Resolution::NoMatch);
        assert!(resolution.into_nodes().is_empty());
    }

    #[tokio::test]
    async fn test_empty_pattern_list_is_no_match() {
        let document = document("<main><article>a</article></main>").await;
        assert!(!resolver(&[]).resolve(&document).await.is_match());
    }

    #[tokio::test]
    async fn test_failing_pattern_is_skipped() {
        let document = document("<main><article>a</article></main>").await;
        let resolution = resolver(&["main [[[", "main article"]).resolve(&document).await;
        assert_eq!(resolution.outcome().unwrap().pattern, "main article");
    }
}
