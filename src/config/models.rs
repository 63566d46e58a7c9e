use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:5000".parse().unwrap()
}

/// Backend strategy selector. Serialized as the integers 1-3 used in the
/// configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mode {
    /// Anonymous cookie/session bootstrap against the share page
    Session,
    /// Operator cookie plus signed-URL reconstruction
    SignedUrl,
    /// Token exchange through an external gateway
    TokenExchange,
}

impl Mode {
    pub fn as_u8(self) -> u8 {
        match self {
            Mode::Session => 1,
            Mode::SignedUrl => 2,
            Mode::TokenExchange => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Session => "session",
            Mode::SignedUrl => "signed-url",
            Mode::TokenExchange => "token-exchange",
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Mode::Session),
            2 => Ok(Mode::SignedUrl),
            3 => Ok(Mode::TokenExchange),
            other => Err(format!("invalid mode {other}, expected 1-3")),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode.as_u8()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upstream account configuration (the flat mode/cookie/user record)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    /// Account cookie (environment takes priority over the file)
    #[serde(default)]
    pub cookie: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            cookie: String::new(),
            user_id: default_user_id(),
        }
    }
}

fn default_mode() -> Mode {
    Mode::TokenExchange
}

fn default_user_id() -> String {
    "null".to_string()
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
