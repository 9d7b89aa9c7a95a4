//! Parsed page snapshot
//!
//! This module answers selector queries against one loaded HTML page:
//! - matching nodes for a CSS pattern in document order
//! - reading attributes and visible text of a matched node
//! - resolving a node's link target for clicks
//!
//! The markup is re-parsed per operation so that no parsed tree is held across
//! an `.await` in the async session implementations.

use crate::document::{DocumentError, DocumentResult, NodeContent, NodeHandle};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One loaded page and the generation it belongs to
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: Url,
    body: String,
    generation: u64,
}

impl HtmlPage {
    pub fn new(url: Url, body: String, generation: u64) -> Self {
        Self {
            url,
            body,
            generation,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Extracts the page title from the `<title>` element
    ///
    /// # Example
    ///
    /// ```
    /// use convo_archiver::document::HtmlPage;
    /// use url::Url;
    ///
    /// let html = r#"<html><head><title> Test </title></head><body></body></html>"#;
    /// let page = HtmlPage::new(Url::parse("https://example.com/").unwrap(), html.into(), 1);
    /// assert_eq!(page.title(), "Test");
    /// ```
    pub fn title(&self) -> String {
        let document = Html::parse_document(&self.body);
        let Ok(title_selector) = Selector::parse("title") else {
            return String::new();
        };

        document
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Returns one handle per node matching `pattern`, in document order
    pub fn query(&self, pattern: &str) -> DocumentResult<Vec<NodeHandle>> {
        let selector = parse_selector(pattern)?;
        let document = Html::parse_document(&self.body);
        let count = document.select(&selector).count();

        Ok((0..count)
            .map(|index| NodeHandle {
                generation: self.generation,
                pattern: pattern.to_string(),
                index,
            })
            .collect())
    }

    /// Reads an attribute of a matched node
    pub fn attribute(&self, node: &NodeHandle, name: &str) -> DocumentResult<Option<String>> {
        self.with_node(node, |element| {
            element.value().attr(name).map(|value| value.to_string())
        })
    }

    /// Reads the visible text of a matched node
    ///
    /// Text fragments are concatenated, then each line is trimmed and blank
    /// lines are removed.
    pub fn text(&self, node: &NodeHandle) -> DocumentResult<String> {
        self.with_node(node, visible_text)
    }

    /// Reads several attributes and the text of a node from one parse
    pub fn read_node(&self, node: &NodeHandle, attributes: &[&str]) -> DocumentResult<NodeContent> {
        self.with_node(node, |element| NodeContent {
            attributes: attributes
                .iter()
                .map(|name| element.value().attr(name).map(|value| value.to_string()))
                .collect(),
            text: visible_text(element),
        })
    }

    /// Resolves the absolute link target of a matched node
    pub fn link_target(&self, node: &NodeHandle) -> DocumentResult<Url> {
        let href = self.attribute(node, "href")?.ok_or_else(|| DocumentError::NotNavigable {
            pattern: node.pattern.clone(),
            index: node.index,
        })?;

        self.url
            .join(href.trim())
            .map_err(|_| DocumentError::NotNavigable {
                pattern: node.pattern.clone(),
                index: node.index,
            })
    }

    fn with_node<T>(&self, node: &NodeHandle, read: impl FnOnce(ElementRef<'_>) -> T) -> DocumentResult<T> {
        let stale = || DocumentError::StaleNode {
            pattern: node.pattern.clone(),
            index: node.index,
        };

        if node.generation != self.generation {
            return Err(stale());
        }

        let selector = parse_selector(&node.pattern)?;
        let document = Html::parse_document(&self.body);
        let element = document.select(&selector).nth(node.index).ok_or_else(stale)?;
        Ok(read(element))
    }
}

fn visible_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<String>();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_selector(pattern: &str) -> DocumentResult<Selector> {
    Selector::parse(pattern).map_err(|e| DocumentError::InvalidPattern {
        pattern: pattern.to_string(),
        message: format!("{:?}", e),
    })
}
