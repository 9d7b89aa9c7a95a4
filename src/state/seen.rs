use crate::url::ConversationIdentity;
use std::collections::HashSet;

/// Run-scoped set of conversations already exported
///
/// Owned by the caller and lent to the coordinator for the whole run. It only
/// grows; an identity in the set is never handed to the export sink again.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    identities: HashSet<ConversationIdentity>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &ConversationIdentity) -> bool {
        self.identities.contains(identity)
    }

    /// Records an identity; returns false if it was already present
    pub fn insert(&mut self, identity: ConversationIdentity) -> bool {
        self.identities.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationIdentity> {
        self.identities.iter()
    }
}
