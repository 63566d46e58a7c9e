use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "TERALINK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/teralink.toml";
const ENV_PREFIX: &str = "TERALINK";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;

    load_secrets(&mut config);

    Ok(config)
}

/// Load secrets from environment variables into config
/// The account cookie should live in the environment, not in TOML files
fn load_secrets(config: &mut Config) {
    if let Ok(cookie) = env::var("TERALINK_COOKIE") {
        config.upstream.cookie = cookie;
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // Environment variable overrides
    // TERALINK__UPSTREAM__MODE -> upstream.mode
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.upstream.mode, Mode::TokenExchange);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"

[upstream]
mode = 2
cookie = "ndus=abc123"
user_id = "42"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.upstream.mode, Mode::SignedUrl);
        assert_eq!(config.upstream.cookie, "ndus=abc123");
        assert_eq!(config.upstream.user_id, "42");
    }

    // Note: env override tests are omitted due to unsafe env::set_var usage;
    // environment overrides are exercised in integration deployments

    #[test]
    fn test_load_rejects_invalid_mode() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[upstream]\nmode = 9\n").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }

    #[test]
    fn test_http_section() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[http]
connect_timeout_secs = 5
request_timeout_secs = 30
user_agent = "teralink-test/1.0"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.http.connect_timeout_secs, 5);
        assert_eq!(config.http.request_timeout_secs, 30);
        assert_eq!(config.http.user_agent, "teralink-test/1.0");
    }
}
