//! Offline document session over saved pages
//!
//! Pages are keyed by their canonical address. A directory of saved pages maps
//! file paths to addresses below a base URL: `index.html` is the base itself,
//! `c/abc.html` is `<base>/c/abc`.

use crate::document::{
    Document, DocumentError, DocumentResult, HtmlPage, NodeContent, NodeHandle,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use url::Url;
use walkdir::WalkDir;

/// Document session serving pages from memory
#[derive(Debug, Default)]
pub struct SnapshotDocument {
    pages: HashMap<String, String>,
    page: Option<HtmlPage>,
    generation: u64,
}

impl SnapshotDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the markup served for an address
    pub fn insert(&mut self, url: &str, html: impl Into<String>) -> DocumentResult<()> {
        let url = Url::parse(url).map_err(|_| DocumentError::InvalidAddress(url.to_string()))?;
        self.pages.insert(page_key(&url), html.into());
        Ok(())
    }

    /// Builder-style variant of [`SnapshotDocument::insert`]
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> DocumentResult<Self> {
        self.insert(url, html)?;
        Ok(self)
    }

    /// Loads every `.html` file below `dir`, addressed relative to `base_url`
    pub fn from_dir(base_url: &str, dir: &Path) -> DocumentResult<Self> {
        let base =
            Url::parse(base_url).map_err(|_| DocumentError::InvalidAddress(base_url.to_string()))?;
        let mut document = Self::new();

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("html")
            {
                continue;
            }

            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let mut address = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if address == "index" {
                address.clear();
            } else if let Some(parent) = address.strip_suffix("/index") {
                address = parent.to_string();
            }

            let url = base
                .join(&address)
                .map_err(|_| DocumentError::InvalidAddress(address.clone()))?;
            let html = std::fs::read_to_string(path)?;
            tracing::debug!("Loaded snapshot {} as {}", path.display(), url);
            document.pages.insert(page_key(&url), html);
        }

        Ok(document)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn page(&self) -> DocumentResult<&HtmlPage> {
        self.page.as_ref().ok_or(DocumentError::NoPage)
    }

    fn load(&mut self, url: Url) -> DocumentResult<()> {
        let body = self
            .pages
            .get(&page_key(&url))
            .cloned()
            .ok_or_else(|| DocumentError::Navigation {
                url: url.to_string(),
                message: "no snapshot for this address".to_string(),
            })?;

        self.generation += 1;
        self.page = Some(HtmlPage::new(url, body, self.generation));
        Ok(())
    }
}

/// Canonical lookup key: no fragment, no trailing slash except the root
fn page_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    url.to_string()
}

#[async_trait]
impl Document for SnapshotDocument {
    async fn navigate(&mut self, url: &str) -> DocumentResult<()> {
        let target = match &self.page {
            Some(page) => page.url().join(url),
            None => Url::parse(url),
        }
        .map_err(|_| DocumentError::InvalidAddress(url.to_string()))?;

        self.load(target)
    }

    fn current_url(&self) -> String {
        self.page
            .as_ref()
            .map(|page| page.url().to_string())
            .unwrap_or_else(|| "about:blank".to_string())
    }

    async fn title(&self) -> DocumentResult<String> {
        Ok(self.page()?.title())
    }

    async fn query(&self, pattern: &str) -> DocumentResult<Vec<NodeHandle>> {
        self.page()?.query(pattern)
    }

    async fn attribute(&self, node: &NodeHandle, name: &str) -> DocumentResult<Option<String>> {
        self.page()?.attribute(node, name)
    }

    async fn text(&self, node: &NodeHandle) -> DocumentResult<String> {
        self.page()?.text(node)
    }

    async fn read_node(&self, node: &NodeHandle, attributes: &[&str]) -> DocumentResult<NodeContent> {
        self.page()?.read_node(node, attributes)
    }

    async fn click(&mut self, node: &NodeHandle) -> DocumentResult<()> {
        let target = self.page()?.link_target(node)?;
        self.load(target)
    }

    async fn content(&self) -> DocumentResult<String> {
        Ok(self.page()?.body().to_string())
    }
}
