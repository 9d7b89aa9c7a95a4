use crate::url::ScopeRule;
use std::fmt;

/// Which scopes a run traverses
///
/// Exactly one mode is active per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMode {
    /// Only conversations outside every project
    RootOnly,
    /// Only conversations inside one named project
    Project(String),
    /// The root collection followed by every discovered project
    AllScopes,
}

impl CrawlMode {
    /// Builds the mode from the mutually exclusive CLI selections
    pub fn from_selection(project: Option<String>, all: bool) -> Self {
        match (project, all) {
            (_, true) => Self::AllScopes,
            (Some(name), false) => Self::Project(name),
            (None, false) => Self::RootOnly,
        }
    }

    /// Returns true if the root phase runs in this mode
    pub fn includes_root(&self) -> bool {
        !matches!(self, Self::Project(_))
    }

    /// Partition rule for the root phase
    ///
    /// When an all-scopes run discovers no named scope at all, the root phase
    /// is the only phase and keeps every reference.
    pub fn root_rule(&self, marker: &str, named_phases: usize) -> ScopeRule {
        match self {
            Self::AllScopes if named_phases == 0 => ScopeRule::AllScopes,
            _ => ScopeRule::root_only(marker),
        }
    }

    /// Short label used in logs, export directory names and the manifest
    pub fn label(&self) -> String {
        match self {
            Self::RootOnly => "root".to_string(),
            Self::Project(name) => format!("project:{}", name),
            Self::AllScopes => "all".to_string(),
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootOnly => f.write_str("conversations outside projects"),
            Self::Project(name) => write!(f, "project '{}' only", name),
            Self::AllScopes => f.write_str("all conversations, including projects"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_selection() {
        assert_eq!(CrawlMode::from_selection(None, false), CrawlMode::RootOnly);
        assert_eq!(
            CrawlMode::from_selection(Some("Work".into()), false),
            CrawlMode::Project("Work".into())
        );
        assert_eq!(CrawlMode::from_selection(None, true), CrawlMode::AllScopes);
    }

    #[test]
    fn test_project_mode_skips_root() {
        assert!(CrawlMode::RootOnly.includes_root());
        assert!(CrawlMode::AllScopes.includes_root());
        assert!(!CrawlMode::Project("Work".into()).includes_root());
    }

    #[test]
    fn test_root_rule() {
        let marker = "/g/g-p-";
        assert_eq!(
            CrawlMode::RootOnly.root_rule(marker, 0),
            ScopeRule::root_only(marker)
        );
        assert_eq!(
            CrawlMode::AllScopes.root_rule(marker, 2),
            ScopeRule::root_only(marker)
        );
        assert_eq!(CrawlMode::AllScopes.root_rule(marker, 0), ScopeRule::AllScopes);
    }

    #[test]
    fn test_label() {
        assert_eq!(CrawlMode::RootOnly.label(), "root");
        assert_eq!(CrawlMode::Project("Work".into()).label(), "project:Work");
        assert_eq!(CrawlMode::AllScopes.label(), "all");
    }
}
