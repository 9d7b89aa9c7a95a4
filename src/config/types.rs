use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Convo-Archiver
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub selectors: SelectorConfig,
    pub keywords: KeywordConfig,
    pub output: OutputConfig,
}

/// Document session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Address the session opens before the ready gate
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Raw `Cookie` header value carrying an authenticated session
    pub cookie: Option<String>,

    /// Overrides the default user agent string
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Timeout for the initial navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// How long to poll for the conversation sidebar (milliseconds)
    #[serde(rename = "sidebar-timeout-ms")]
    pub sidebar_timeout_ms: u64,

    /// Upper bound for processing a single conversation (milliseconds)
    #[serde(rename = "item-timeout-ms")]
    pub item_timeout_ms: u64,

    /// Delay after each navigation before querying (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Delay after entering a named scope (milliseconds)
    #[serde(rename = "scope-settle-ms")]
    pub scope_settle_ms: u64,
}

impl SessionConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn sidebar_timeout(&self) -> Duration {
        Duration::from_millis(self.sidebar_timeout_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scope_settle(&self) -> Duration {
        Duration::from_millis(self.scope_settle_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_url: "https://chatgpt.com/".to_string(),
            cookie: None,
            user_agent: None,
            navigation_timeout_ms: 30_000,
            sidebar_timeout_ms: 60_000,
            item_timeout_ms: 60_000,
            settle_ms: 2_000,
            scope_settle_ms: 3_000,
        }
    }
}

/// Ordered selector pattern lists, tried first to last
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Patterns matching one node per conversational turn
    pub turns: Vec<String>,

    /// Patterns matching conversation links
    pub links: Vec<String>,

    /// Patterns whose presence means the conversation list has rendered
    pub sidebar: Vec<String>,

    /// Patterns matching named-scope (project) entry points
    pub scopes: Vec<String>,

    /// Substring identifying a reference as belonging to a named scope
    #[serde(rename = "scope-marker")]
    pub scope_marker: String,

    /// Attribute carrying an explicit turn role
    #[serde(rename = "role-attribute")]
    pub role_attribute: String,

    /// Attribute inspected for role tokens when no explicit role is present
    #[serde(rename = "class-attribute")]
    pub class_attribute: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            turns: strings(&[
                r#"main [data-testid="conversation-turn"]"#,
                "main [data-message-author-role]",
                "main article",
                r#"main div[class*="group"]"#,
            ]),
            links: strings(&[r#"a[href*="/c/"]"#]),
            sidebar: strings(&[
                r#"[data-testid="conversation-list"]"#,
                r#"nav a[href*="/c/"]"#,
                r#"aside a[href*="/c/"]"#,
                r#"div[class*="sidebar"] a[href*="/c/"]"#,
            ]),
            scopes: strings(&[
                r#"nav a[href*="/g/g-p-"][href$="/project"]"#,
                r#"aside a[href*="/g/g-p-"][href$="/project"]"#,
                r#"[data-testid="project-list"] a"#,
                r#"div[class*="project"] a"#,
            ]),
            scope_marker: "/g/g-p-".to_string(),
            role_attribute: "data-message-author-role".to_string(),
            class_attribute: "class".to_string(),
        }
    }
}

/// Keyword derivation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Maximum number of keywords derived per conversation
    #[serde(rename = "max-keywords")]
    pub max_keywords: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self { max_keywords: 5 }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory in which the per-run export directory is created
    pub directory: String,

    /// Write one Markdown transcript per conversation
    #[serde(rename = "write-markdown")]
    pub write_markdown: bool,

    /// Write one JSON metadata file per conversation
    #[serde(rename = "write-metadata")]
    pub write_metadata: bool,

    /// Keep the raw HTML of each conversation page
    #[serde(rename = "write-html")]
    pub write_html: bool,

    /// Record runs and exported conversations in the SQLite manifest
    #[serde(rename = "write-manifest")]
    pub write_manifest: bool,

    /// Path to the SQLite manifest
    #[serde(rename = "manifest-path")]
    pub manifest_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            write_markdown: true,
            write_metadata: true,
            write_html: true,
            write_manifest: true,
            manifest_path: "./convo-archiver.db".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
