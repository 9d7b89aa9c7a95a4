/// Traversal phase definitions for a crawl run
use std::fmt;

/// Where a run currently is in its phase sequence
///
/// `Idle -> Root -> Named(0) -> ... -> Named(n) -> Done`; the root phase is
/// skipped for single-project runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing has been traversed yet
    Idle,

    /// Traversing the root (non-project) collection
    Root,

    /// Traversing the `index`-th named scope
    Named { index: usize, name: String },

    /// Every phase has finished
    Done,
}

impl CrawlPhase {
    pub fn named(index: usize, name: impl Into<String>) -> Self {
        Self::Named {
            index,
            name: name.into(),
        }
    }

    /// Returns true while a phase is traversing items
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Root | Self::Named { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Checks whether moving to `next` follows the phase order
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Root) | (Self::Idle, Self::Done) => true,
            (Self::Idle, Self::Named { index, .. }) => *index == 0,
            (Self::Root, Self::Named { index, .. }) => *index == 0,
            (Self::Root, Self::Done) => true,
            (Self::Named { index: from, .. }, Self::Named { index: to, .. }) => *to == from + 1,
            (Self::Named { .. }, Self::Done) => true,
            _ => false,
        }
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "idle".to_string(),
            Self::Root => "root".to_string(),
            Self::Named { name, .. } => format!("project:{}", name),
            Self::Done => "done".to_string(),
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
