use std::fmt;

/// Returns true if the raw reference points into a named scope
pub fn is_named_reference(reference: &str, marker: &str) -> bool {
    reference.contains(marker)
}

/// Path prefix of the named scope an address lies in
///
/// The prefix runs from the marker to the end of the path segment the marker
/// opens, slash included.
///
/// # Examples
///
/// ```
/// use convo_archiver::url::scope_prefix;
///
/// let prefix = scope_prefix("https://archive.example.com/g/g-p-7-work/project", "/g/g-p-");
/// assert_eq!(prefix.as_deref(), Some("/g/g-p-7-work/"));
/// assert_eq!(scope_prefix("https://archive.example.com/c/1", "/g/g-p-"), None);
/// ```
pub fn scope_prefix(address: &str, marker: &str) -> Option<String> {
    let start = address.find(marker)?;
    let rest = &address[start + marker.len()..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(format!("{}{}/", marker, &rest[..end]))
}

/// Scope partition rule applied to the references of one traversal phase
///
/// Exactly one rule is active per phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRule {
    /// Keep only references outside every named scope
    RootOnly { marker: String },
    /// Keep only references of the named scope `scope`
    ///
    /// With a `prefix` only references inside that scope's path are kept;
    /// without one, any reference carrying the marker is.
    NamedOnly {
        scope: String,
        marker: String,
        prefix: Option<String>,
    },
    /// Keep everything
    AllScopes,
}

impl ScopeRule {
    pub fn root_only(marker: impl Into<String>) -> Self {
        Self::RootOnly {
            marker: marker.into(),
        }
    }

    pub fn named_only(scope: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::NamedOnly {
            scope: scope.into(),
            marker: marker.into(),
            prefix: None,
        }
    }

    /// Restricts a named-scope rule to references below `prefix`
    pub fn within(self, prefix: impl Into<String>) -> Self {
        match self {
            Self::NamedOnly { scope, marker, .. } => Self::NamedOnly {
                scope,
                marker,
                prefix: Some(prefix.into()),
            },
            other => other,
        }
    }

    /// Decides whether a raw reference belongs to this phase
    ///
    /// # Examples
    ///
    /// ```
    /// use convo_archiver::url::ScopeRule;
    ///
    /// let root = ScopeRule::root_only("/g/g-p-");
    /// assert!(root.includes("/c/abc"));
    /// assert!(!root.includes("/g/g-p-42-work/c/abc"));
    /// ```
    pub fn includes(&self, reference: &str) -> bool {
        match self {
            Self::RootOnly { marker } => !is_named_reference(reference, marker),
            Self::NamedOnly { marker, prefix, .. } => {
                is_named_reference(reference, marker)
                    && prefix
                        .as_deref()
                        .map_or(true, |prefix| reference.contains(prefix))
            }
            Self::AllScopes => true,
        }
    }

    /// Applies the rule, preserving order
    pub fn partition(&self, references: Vec<String>) -> Vec<String> {
        references
            .into_iter()
            .filter(|reference| self.includes(reference))
            .collect()
    }
}

impl fmt::Display for ScopeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootOnly { marker } => write!(f, "root only (excluding '{}')", marker),
            Self::NamedOnly {
                scope,
                prefix: Some(prefix),
                ..
            } => write!(f, "project '{}' only (requiring '{}')", scope, prefix),
            Self::NamedOnly { scope, marker, .. } => {
                write!(f, "project '{}' only (requiring '{}')", scope, marker)
            }
            Self::AllScopes => f.write_str("all scopes"),
        }
    }
}
