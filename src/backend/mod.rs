//! Upstream backend strategies.
//!
//! Three mutually-exclusive strategies implement [`ShareBackend`], selected
//! by the configured [`Mode`](crate::config::Mode) when the server starts:
//!
//! - [`SessionBackend`] - anonymous cookie/session bootstrap (mode 1)
//! - [`SignedBackend`] - operator cookie, signed-URL reconstruction (mode 2)
//! - [`TokenBackend`] - token exchange via an external gateway (mode 3)

pub mod http;
pub mod parser;
mod session;
mod signed;
mod token;
mod traits;
pub mod types;

pub use session::SessionBackend;
pub use signed::SignedBackend;
pub use token::TokenBackend;
pub use traits::{BackendError, SessionStatus, ShareBackend};
pub use types::{
    FileManifest, LinkBundle, LinkRequest, ShareFile, SignedLinkParams,
};

use std::sync::Arc;

use crate::config::{Config, Mode};
use http::UpstreamClient;

/// Build the backend the configuration selects
pub fn from_config(config: &Config) -> Result<Arc<dyn ShareBackend>, BackendError> {
    let client = UpstreamClient::new(&config.http)?;

    Ok(match config.upstream.mode {
        Mode::Session => Arc::new(SessionBackend::new(client)),
        Mode::SignedUrl => Arc::new(SignedBackend::new(
            client,
            config.upstream.cookie.clone(),
        )),
        Mode::TokenExchange => Arc::new(TokenBackend::new(client)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_picks_mode() {
        let mut config: Config = toml::from_str("").unwrap();

        config.upstream.mode = Mode::Session;
        assert_eq!(from_config(&config).unwrap().mode(), Mode::Session);

        config.upstream.mode = Mode::SignedUrl;
        config.upstream.cookie = "ndus=abc".to_string();
        assert_eq!(from_config(&config).unwrap().mode(), Mode::SignedUrl);

        config.upstream.mode = Mode::TokenExchange;
        assert_eq!(from_config(&config).unwrap().mode(), Mode::TokenExchange);
    }
}
