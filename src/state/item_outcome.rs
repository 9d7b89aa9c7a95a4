/// Per-item outcome definitions for a crawl phase
///
/// Every reference a phase iterates over ends in exactly one of these.
use std::fmt;

/// What happened to one conversation reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    // ===== Not attempted =====
    /// Identity was already exported earlier in the run
    AlreadySeen,

    // ===== Terminal Success =====
    /// Conversation was handed to the sink and accepted
    Exported,

    // ===== Terminal Skip States =====
    /// No turn selector matched or every turn was empty
    NoContent,

    /// None of the content filter terms occur in the transcript
    Filtered,

    // ===== Terminal Error States =====
    /// Navigation, extraction or export raised an error
    Failed,

    /// Processing did not finish within the item timeout
    TimedOut,
}

impl ItemOutcome {
    /// Returns true if the item counts towards `attempted`
    pub fn is_attempted(&self) -> bool {
        !matches!(self, Self::AlreadySeen)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exported)
    }

    /// Returns true for attempted items that were not exported
    pub fn is_skipped(&self) -> bool {
        self.is_attempted() && !self.is_success()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadySeen => "already_seen",
            Self::Exported => "exported",
            Self::NoContent => "no_content",
            Self::Filtered => "filtered",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_seen_is_not_attempted() {
        assert!(!ItemOutcome::AlreadySeen.is_attempted());
        assert!(!ItemOutcome::AlreadySeen.is_skipped());
        assert!(ItemOutcome::Exported.is_attempted());
        assert!(ItemOutcome::Filtered.is_attempted());
    }

    #[test]
    fn test_skips_include_errors() {
        assert!(ItemOutcome::NoContent.is_skipped());
        assert!(ItemOutcome::Filtered.is_skipped());
        assert!(ItemOutcome::Failed.is_skipped());
        assert!(ItemOutcome::TimedOut.is_skipped());
        assert!(!ItemOutcome::Exported.is_skipped());
    }

    #[test]
    fn test_is_error() {
        assert!(ItemOutcome::Failed.is_error());
        assert!(ItemOutcome::TimedOut.is_error());
        assert!(!ItemOutcome::NoContent.is_error());
        assert!(!ItemOutcome::Filtered.is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemOutcome::TimedOut.to_string(), "timed_out");
        assert_eq!(format!("{}", ItemOutcome::Exported), "exported");
    }
}
