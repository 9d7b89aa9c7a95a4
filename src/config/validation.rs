use crate::config::types::{Config, KeywordConfig, OutputConfig, SelectorConfig, SessionConfig};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_session_config(&config.session)?;
    validate_selector_config(&config.selectors)?;
    validate_keyword_config(&config.keywords)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates session configuration
fn validate_session_config(config: &SessionConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' must use HTTP or HTTPS",
            config.start_url
        )));
    }

    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.item_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "item-timeout-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates every selector list: non-empty and parseable as CSS
fn validate_selector_config(config: &SelectorConfig) -> ConfigResult<()> {
    for (name, patterns) in [
        ("turns", &config.turns),
        ("links", &config.links),
        ("sidebar", &config.sidebar),
        ("scopes", &config.scopes),
    ] {
        if patterns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selectors.{} must contain at least one pattern",
                name
            )));
        }

        for pattern in patterns {
            Selector::parse(pattern).map_err(|e| {
                ConfigError::InvalidSelector(format!("selectors.{}: '{}': {:?}", name, pattern, e))
            })?;
        }
    }

    if config.scope_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scope-marker cannot be empty".to_string(),
        ));
    }

    if config.role_attribute.trim().is_empty() {
        return Err(ConfigError::Validation(
            "role-attribute cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_keyword_config(config: &KeywordConfig) -> ConfigResult<()> {
    if config.max_keywords < 1 {
        return Err(ConfigError::Validation(format!(
            "max-keywords must be >= 1, got {}",
            config.max_keywords
        )));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.write_manifest && config.manifest_path.is_empty() {
        return Err(ConfigError::Validation(
            "manifest-path cannot be empty when write-manifest is enabled".to_string(),
        ));
    }

    Ok(())
}
