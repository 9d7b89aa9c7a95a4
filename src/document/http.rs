//! HTTP-backed document session
//!
//! This module loads archive pages over HTTP, including:
//! - Building the HTTP client with session cookie and user agent
//! - Following redirects to the final address
//! - Classifying non-success responses
//! - Following link targets for clicks

use crate::config::SessionConfig;
use crate::document::{
    Document, DocumentError, DocumentResult, HtmlPage, NodeContent, NodeHandle,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("convo-archiver/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client for a document session
///
/// # Example
///
/// ```no_run
/// use convo_archiver::config::SessionConfig;
/// use convo_archiver::document::build_http_client;
///
/// let client = build_http_client(&SessionConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SessionConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let mut headers = HeaderMap::new();
    if let Some(cookie) = &config.cookie {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.insert(COOKIE, value);
        } else {
            tracing::warn!("Ignoring session cookie: not a valid header value");
        }
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(config.navigation_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Document session that fetches every page over HTTP
pub struct HttpDocument {
    client: Client,
    page: Option<HtmlPage>,
    generation: u64,
}

impl HttpDocument {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page: None,
            generation: 0,
        }
    }

    /// Builds the client from session configuration
    pub fn from_config(config: &SessionConfig) -> DocumentResult<Self> {
        let client = build_http_client(config).map_err(|source| DocumentError::Http {
            url: config.start_url.clone(),
            source,
        })?;
        Ok(Self::new(client))
    }

    fn page(&self) -> DocumentResult<&HtmlPage> {
        self.page.as_ref().ok_or(DocumentError::NoPage)
    }

    async fn load(&mut self, url: Url) -> DocumentResult<()> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| DocumentError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(DocumentError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| DocumentError::Http {
            url: url.to_string(),
            source,
        })?;

        self.generation += 1;
        tracing::trace!("Loaded {} (generation {})", final_url, self.generation);
        self.page = Some(HtmlPage::new(final_url, body, self.generation));
        Ok(())
    }
}

#[async_trait]
impl Document for HttpDocument {
    async fn navigate(&mut self, url: &str) -> DocumentResult<()> {
        let target = match &self.page {
            Some(page) => page.url().join(url),
            None => Url::parse(url),
        }
        .map_err(|_| DocumentError::InvalidAddress(url.to_string()))?;

        self.load(target).await
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
        self.load(target).await
    }

    async fn content(&self) -> DocumentResult<String> {
        Ok(self.page()?.body().to_string())
    }
}
