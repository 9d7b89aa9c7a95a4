//! Turn classification
//!
//! Converts matched turn nodes into labeled conversational turns. The role of
//! each node comes from the first strategy that yields one:
//! 1. an explicit role attribute
//! 2. a role token inside the node's class marker
//! 3. strict alternation by the number of turns already accepted

use crate::conversation::{ConversationTurn, Role};
use crate::document::{Document, DocumentResult, NodeHandle};

/// Everything read from one node before labeling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSignals {
    pub role_attribute: Option<String>,
    pub class_marker: Option<String>,
    pub text: String,
}

type RoleStrategy = fn(&NodeSignals) -> Option<Role>;

/// Role strategies in priority order; alternation is applied when all decline
const ROLE_STRATEGIES: [RoleStrategy; 2] = [role_from_attribute, role_from_class_marker];

fn role_from_attribute(signals: &NodeSignals) -> Option<Role> {
    signals
        .role_attribute
        .as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(Role::from_token)
}

fn role_from_class_marker(signals: &NodeSignals) -> Option<Role> {
    let marker = signals.class_marker.as_deref()?.to_lowercase();
    if marker.contains("user") {
        Some(Role::User)
    } else if marker.contains("assistant") {
        Some(Role::Assistant)
    } else {
        None
    }
}

/// Labels turn nodes with roles
#[derive(Debug, Clone)]
pub struct TurnClassifier {
    role_attribute: String,
    class_attribute: String,
}

impl Default for TurnClassifier {
    fn default() -> Self {
        Self::new("data-message-author-role", "class")
    }
}

impl TurnClassifier {
    pub fn new(role_attribute: impl Into<String>, class_attribute: impl Into<String>) -> Self {
        Self {
            role_attribute: role_attribute.into(),
            class_attribute: class_attribute.into(),
        }
    }

    /// Reads every node and labels the ones carrying text
    ///
    /// A node that fails to read is logged and skipped; the remaining nodes
    /// are still classified.
    pub async fn classify<D>(&self, document: &D, nodes: &[NodeHandle]) -> Vec<ConversationTurn>
    where
        D: Document + ?Sized,
    {
        let mut signals = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.read_node(document, node).await {
                Ok(read) => signals.push(read),
                Err(e) => {
                    tracing::warn!("Skipping turn node {} of '{}': {}", node.index, node.pattern, e);
                }
            }
        }

        label_turns(signals)
    }

    async fn read_node<D>(&self, document: &D, node: &NodeHandle) -> DocumentResult<NodeSignals>
    where
        D: Document + ?Sized,
    {
        let content = document
            .read_node(node, &[self.role_attribute.as_str(), self.class_attribute.as_str()])
            .await?;
        let mut attributes = content.attributes.into_iter();

        Ok(NodeSignals {
            role_attribute: attributes.next().flatten(),
            class_marker: attributes.next().flatten(),
            text: content.text,
        })
    }
}

/// Labels already-read node signals
///
/// Nodes whose trimmed text is empty are dropped without consuming an
/// alternation slot.
pub fn label_turns(signals: impl IntoIterator<Item = NodeSignals>) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = Vec::new();

    for node in signals {
        let text = node.text.trim();
        if text.is_empty() {
            continue;
        }

        let role = ROLE_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(&node))
            .unwrap_or_else(|| Role::alternating(turns.len()));

        turns.push(ConversationTurn::new(role, text));
    }

    turns
}
