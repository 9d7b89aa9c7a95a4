use crate::{UrlError, UrlResult};
use std::fmt;
use url::{form_urlencoded, Url};

/// Query parameters that never identify a conversation
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Canonical absolute address of one conversation
///
/// Derived once from a raw reference and never modified; equality is plain
/// string equality of the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationIdentity(String);

impl ConversationIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConversationIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw link reference into a conversation identity
///
/// # Normalization Steps
///
/// 1. Resolve the reference against the address it was found on
/// 2. Reject anything but HTTP(S) and host-less addresses
/// 3. Lowercase the host
/// 4. Remove dot segments and the trailing slash (except for root /)
/// 5. Remove the fragment
/// 6. Remove tracking query parameters, sort the rest, drop an empty query
///
/// # Examples
///
/// ```
/// use convo_archiver::url::normalize_reference;
///
/// let id = normalize_reference("/c/abc/#turn-2", "https://Archive.Example.com/").unwrap();
/// assert_eq!(id.as_str(), "https://archive.example.com/c/abc");
/// ```
pub fn normalize_reference(raw: &str, base: &str) -> UrlResult<ConversationIdentity> {
    let base = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let mut url = base
        .join(raw.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("{}: {}", host, e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish();
            url.set_query(Some(&query));
        }
    }

    Ok(ConversationIdentity(url.to_string()))
}

/// Removes empty and dot segments and the trailing slash
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://archive.example.com/c/current";

    #[test]
    fn test_relative_reference() {
        let id = normalize_reference("/c/abc", BASE).unwrap();
        assert_eq!(id.as_str(), "https://archive.example.com/c/abc");
    }

    #[test]
    fn test_absolute_reference_keeps_its_host() {
        let id = normalize_reference("https://other.example.com/c/abc", BASE).unwrap();
        assert_eq!(id.as_str(), "https://other.example.com/c/abc");
    }

    #[test]
    fn test_same_conversation_different_spellings() {
        let a = normalize_reference("/c/abc", BASE).unwrap();
        let b = normalize_reference("https://ARCHIVE.example.com/c/abc/", BASE).unwrap();
        let c = normalize_reference("/c/./abc#message-4", BASE).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_project_reference_path_preserved() {
        let id = normalize_reference("/g/g-p-123abc-work/c/xyz", BASE).unwrap();
        assert_eq!(
            id.as_str(),
            "https://archive.example.com/g/g-p-123abc-work/c/xyz"
        );
    }

    #[test]
    fn test_tracking_params_removed() {
        let id = normalize_reference("/c/abc?utm_source=x&b=2&a=1&ref=nav", BASE).unwrap();
        assert_eq!(id.as_str(), "https://archive.example.com/c/abc?a=1&b=2");

        let bare = normalize_reference("/c/abc?utm_medium=y", BASE).unwrap();
        assert_eq!(bare.as_str(), "https://archive.example.com/c/abc");
    }

    #[test]
    fn test_http_scheme_kept() {
        let id = normalize_reference("http://127.0.0.1:8080/c/1", BASE).unwrap();
        assert_eq!(id.as_str(), "http://127.0.0.1:8080/c/1");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            normalize_reference("javascript:void(0)", BASE),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            normalize_reference("mailto:someone@example.com", BASE),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            normalize_reference("/c/abc", "about:blank"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_encoded_query_values_survive() {
        let id = normalize_reference("/c/abc?q=a%26b%3Dc&id=1", BASE).unwrap();
        assert_eq!(id.as_str(), "https://archive.example.com/c/abc?id=1&q=a%26b%3Dc");
    }
}
