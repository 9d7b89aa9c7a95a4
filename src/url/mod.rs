//! URL handling module for Convo-Archiver
//!
//! This module provides reference normalization into conversation identities
//! and the scope partition rules that decide which references belong to a
//! traversal phase.

mod normalize;
mod scope;

// Re-export main types
pub use normalize::{normalize_reference, ConversationIdentity};
pub use scope::{is_named_reference, scope_prefix, ScopeRule};
