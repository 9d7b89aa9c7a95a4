//! Configuration module for Convo-Archiver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use convo_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Session starts at: {}", config.session.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, KeywordConfig, OutputConfig, SelectorConfig, SessionConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
