use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use convo_archiver::config::load_config;
///
/// let config = load_config(Path::new("archiver.toml")).unwrap();
/// println!("Max keywords: {}", config.keywords.max_keywords);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded alongside every export so that a transcript can be
/// traced back to the selector set that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_text(&content))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

fn hash_text(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[session]
start-url = "https://archive.example.com/"
cookie = "session=abc"
settle-ms = 250

[selectors]
turns = ["main .turn"]
scope-marker = "/projects/"

[keywords]
max-keywords = 8

[output]
directory = "/tmp/exports"
write-html = false
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.session.start_url, "https://archive.example.com/");
        assert_eq!(config.session.cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.session.settle_ms, 250);
        assert_eq!(config.session.sidebar_timeout_ms, 60_000);
        assert_eq!(config.selectors.turns, vec!["main .turn".to_string()]);
        assert_eq!(config.selectors.scope_marker, "/projects/");
        assert!(!config.selectors.links.is_empty());
        assert_eq!(config.keywords.max_keywords, 8);
        assert!(!config.output.write_html);
        assert!(config.output.write_markdown);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.session.start_url, "https://chatgpt.com/");
        assert_eq!(config.selectors.turns.len(), 4);
        assert_eq!(config.selectors.scope_marker, "/g/g-p-");
        assert_eq!(config.keywords.max_keywords, 5);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/archiver.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("[session\nstart-url = ");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = parse_config("[keywords]\nmax-keywords = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config("[keywords]\nmax-keywords = 3\n");
        let first = compute_config_hash(file.path()).unwrap();
        let second = compute_config_hash(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config("");
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.keywords.max_keywords, 5);
        assert_eq!(hash, hash_text(""));
    }
}
