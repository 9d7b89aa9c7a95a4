//! Document session abstraction
//!
//! The crawler never talks to a rendering engine directly. Everything it needs
//! from the live archive goes through the [`Document`] trait:
//! - navigation and the current address
//! - selector queries returning ordered node handles
//! - per-node attribute/text reads and clicks
//!
//! Two implementations ship with the crate: [`HttpDocument`] fetches pages
//! over HTTP and [`SnapshotDocument`] serves previously saved HTML pages.
//! Both query markup through the same [`HtmlPage`] snapshot.

mod http;
mod page;
mod snapshot;

pub use http::{build_http_client, HttpDocument};
pub use page::HtmlPage;
pub use snapshot::SnapshotDocument;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a document session
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid selector pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Node {index} of '{pattern}' is stale")]
    StaleNode { pattern: String, index: usize },

    #[error("Node {index} of '{pattern}' has no navigable target")]
    NotNavigable { pattern: String, index: usize },

    #[error("No page is loaded")]
    NoPage,

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Returns true for failures scoped to a single operation that a later
    /// operation may not hit again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StaleNode { .. } | Self::Http { .. } | Self::Navigation { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Handle to one node matched by a selector query
///
/// Handles are only valid for the page generation they were matched in; any
/// navigation invalidates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Page generation the node was matched in
    pub generation: u64,
    /// The pattern that matched the node
    pub pattern: String,
    /// Position among that pattern's matches
    pub index: usize,
}

/// Attributes and visible text of one node, read together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeContent {
    /// Attribute values in the order they were requested
    pub attributes: Vec<Option<String>>,
    pub text: String,
}

/// A navigable document session
///
/// There is exactly one session per run and every navigation mutates it, so
/// callers drive it strictly sequentially.
#[async_trait]
pub trait Document: Send + Sync {
    /// Navigates the session to an absolute address
    async fn navigate(&mut self, url: &str) -> DocumentResult<()>;

    /// The address currently loaded, `about:blank` before the first navigation
    fn current_url(&self) -> String;

    /// The title of the current page (empty if the page has none)
    async fn title(&self) -> DocumentResult<String>;

    /// Runs a selector query and returns the matches in document order
    async fn query(&self, pattern: &str) -> DocumentResult<Vec<NodeHandle>>;

    /// Reads an attribute of a matched node
    async fn attribute(&self, node: &NodeHandle, name: &str) -> DocumentResult<Option<String>>;

    /// Reads the visible text of a matched node
    async fn text(&self, node: &NodeHandle) -> DocumentResult<String>;

    /// Reads the given attributes and the text of a node at once
    ///
    /// Sessions backed by parsed markup override this to read everything from
    /// a single parse.
    async fn read_node(&self, node: &NodeHandle, attributes: &[&str]) -> DocumentResult<NodeContent> {
        let mut values = Vec::with_capacity(attributes.len());
        for name in attributes {
            values.push(self.attribute(node, name).await?);
        }
        let text = self.text(node).await?;
        Ok(NodeContent {
            attributes: values,
            text,
        })
    }

    /// Activates a matched node (following its link target)
    async fn click(&mut self, node: &NodeHandle) -> DocumentResult<()>;

    /// Raw markup of the current page
    async fn content(&self) -> DocumentResult<String>;
}
