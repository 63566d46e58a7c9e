//! Configuration management for teralink
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use teralink::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `TERALINK__<section>__<key>`
//!
//! Examples:
//! - `TERALINK__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `TERALINK__UPSTREAM__MODE=2`
//! - `TERALINK_COOKIE=ndus=...` (cookie secret, never stored in TOML)
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/teralink.toml`.
//! This can be overridden using the `TERALINK_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, HttpConfig, Mode, ServerConfig, UpstreamConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`TERALINK__*`)
    /// 2. TOML file (default: `config/teralink.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - The mode is out of range or incompatible with the rest of the record
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[upstream]
mode = 3
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.upstream.mode, Mode::TokenExchange);
    }

    #[test]
    fn test_validation_catches_missing_cookie() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[upstream]
mode = 2
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::CookieRequired { .. })
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:5000"

[upstream]
mode = 1
cookie = "browserid=abc; ndus=def"
user_id = "123456"

[http]
connect_timeout_secs = 10
request_timeout_secs = 60
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.upstream.mode, Mode::Session);
        assert_eq!(config.upstream.user_id, "123456");
        assert_eq!(config.http.request_timeout_secs, 60);
    }
}
