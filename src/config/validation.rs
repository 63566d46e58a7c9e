use thiserror::Error;

use super::models::{Config, Mode};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("mode {mode} requires a configured upstream cookie")]
    CookieRequired { mode: u8 },
}

/// Validate cross-field constraints after deserialization.
///
/// Out-of-range modes are already rejected while deserializing [`Mode`];
/// this pass catches combinations that would only fail at request time,
/// such as running the signed-URL strategy without an account cookie.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.upstream.mode == Mode::SignedUrl
        && config.upstream.cookie.trim().is_empty()
    {
        return Err(ValidationError::CookieRequired {
            mode: config.upstream.mode.as_u8(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(mode: Mode, cookie: &str) -> Config {
        let mut config: Config = toml::from_str("").unwrap();
        config.upstream.mode = mode;
        config.upstream.cookie = cookie.to_string();
        config
    }

    #[test]
    fn test_signed_url_mode_requires_cookie() {
        let config = config_with(Mode::SignedUrl, "");
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ValidationError::CookieRequired { mode: 2 }));
    }

    #[test]
    fn test_signed_url_mode_with_cookie_passes() {
        let config = config_with(Mode::SignedUrl, "ndus=abc");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_cookieless_modes_pass() {
        assert!(validate(&config_with(Mode::Session, "")).is_ok());
        assert!(validate(&config_with(Mode::TokenExchange, "")).is_ok());
    }
}
