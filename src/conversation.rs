//! Conversation data model
//!
//! A [`Conversation`] is built once per visited item and never mutated
//! afterwards; downstream collaborators only read it.

use serde::Serialize;
use std::fmt;

/// Speaker of one conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role assigned by strict alternation for the given accepted-turn index
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            Self::User
        } else {
            Self::Assistant
        }
    }

    /// Parses a role token; anything other than "user" is treated as the assistant
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("user") {
            Self::User
        } else {
            Self::Assistant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Heading label used in rendered transcripts
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled unit of conversational text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Traversal scope a conversation was found in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Scope {
    /// The flat, non-project collection
    Root,
    /// A named sub-collection (project)
    Named(String),
}

impl Scope {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Named(name) => write!(f, "project '{}'", name),
        }
    }
}

/// A fully extracted conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub title: String,
    pub turns: Vec<ConversationTurn>,
    pub scope: Scope,
}

impl Conversation {
    pub fn new(title: impl Into<String>, turns: Vec<ConversationTurn>, scope: Scope) -> Self {
        Self {
            title: title.into(),
            turns,
            scope,
        }
    }

    /// All turn text joined with blank lines, used for keyword derivation
    /// and content filtering
    pub fn full_text(&self) -> String {
        self.turns
            .iter()
            .map(|turn| turn.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Returns true if any of the terms occurs in the transcript (case-insensitive)
    pub fn mentions_any(&self, terms: &[String]) -> bool {
        let haystack = self.full_text().to_lowercase();
        terms
            .iter()
            .any(|term| haystack.contains(&term.to_lowercase()))
    }

    /// Returns the terms that occur in the transcript, in the given order
    pub fn mentioned_terms(&self, terms: &[String]) -> Vec<String> {
        let haystack = self.full_text().to_lowercase();
        terms
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .cloned()
            .collect()
    }
}
