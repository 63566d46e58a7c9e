use async_trait::async_trait;
use thiserror::Error;

use super::types::{FileManifest, LinkBundle, LinkRequest};
use crate::config::Mode;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid share url: {0}")]
    InvalidShareUrl(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream rejected request (errno {errno}): {message}")]
    UpstreamRejected { errno: i64, message: String },

    #[error("unexpected upstream payload: {0}")]
    UnexpectedPayload(String),

    #[error("request not supported by the {0} backend")]
    Unsupported(&'static str),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Upstream(err.to_string())
    }
}

/// Result of an upstream session check (`/get_config`)
#[derive(Debug, Clone, Copy)]
pub struct SessionStatus {
    pub logged_in: bool,
}

/// One upstream strategy, selected by [`Mode`] at startup.
///
/// All three strategies expose the same surface: resolve a share URL into a
/// file manifest, turn mode-specific parameters into download links, and
/// answer whether the configured upstream session is usable.
#[async_trait]
pub trait ShareBackend: Send + Sync {
    fn mode(&self) -> Mode;

    /// Check the upstream session backing this strategy. Cookie-less
    /// strategies only confirm the upstream is reachable.
    async fn verify_session(&self) -> Result<SessionStatus, BackendError>;

    /// Resolve share metadata for a share URL
    async fn resolve_file(
        &self,
        share_url: &str,
    ) -> Result<FileManifest, BackendError>;

    /// Produce direct download links from mode-specific parameters
    async fn generate_link(
        &self,
        request: LinkRequest,
    ) -> Result<LinkBundle, BackendError>;
}
