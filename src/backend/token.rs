//! Mode 3: token exchange through an external gateway.
//!
//! `get-info` returns the share's signed identity tuple (shareid, uk, sign,
//! timestamp) along with the file list; `get-download` exchanges that tuple
//! for a direct link. No account cookie is involved.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::http::UpstreamClient;
use super::parser::extract_surl;
use super::traits::{BackendError, SessionStatus, ShareBackend};
use super::types::{
    FileManifest, LinkBundle, LinkRequest, ShareFile, field_string,
    mirror_variants,
};
use crate::config::Mode;

const GATEWAY: &str = "https://terabox.hnn.workers.dev";

pub struct TokenBackend {
    http: UpstreamClient,
}

impl TokenBackend {
    pub fn new(http: UpstreamClient) -> Self {
        Self { http }
    }
}

/// Gateway responses flag failure with `"ok": false` instead of an errno
fn ensure_ok(value: &Value) -> Result<(), BackendError> {
    match value.get("ok").and_then(Value::as_bool) {
        Some(true) | None => Ok(()),
        Some(false) => Err(BackendError::UpstreamRejected {
            errno: -1,
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("gateway rejected the request")
                .to_string(),
        }),
    }
}

#[async_trait]
impl ShareBackend for TokenBackend {
    fn mode(&self) -> Mode {
        Mode::TokenExchange
    }

    async fn verify_session(&self) -> Result<SessionStatus, BackendError> {
        // No account session; a reachable gateway is all the strategy needs
        self.http.get_page(GATEWAY).await?;
        Ok(SessionStatus { logged_in: true })
    }

    async fn resolve_file(
        &self,
        share_url: &str,
    ) -> Result<FileManifest, BackendError> {
        let surl = extract_surl(share_url).ok_or_else(|| {
            BackendError::InvalidShareUrl(share_url.to_string())
        })?;

        let info = self
            .http
            .get_json(
                &format!("{GATEWAY}/api/get-info?shorturl={surl}&pwd="),
                &[],
            )
            .await?;
        ensure_ok(&info)?;

        let list = info
            .get("list")
            .and_then(Value::as_array)
            .map(|items| {
                items.iter().filter_map(ShareFile::from_upstream).collect()
            })
            .unwrap_or_default();

        Ok(FileManifest {
            status: "success".to_string(),
            uk: field_string(&info, "uk"),
            shareid: field_string(&info, "shareid"),
            sign: field_string(&info, "sign"),
            timestamp: field_string(&info, "timestamp"),
            js_token: None,
            cookie: None,
            list,
        })
    }

    async fn generate_link(
        &self,
        request: LinkRequest,
    ) -> Result<LinkBundle, BackendError> {
        let LinkRequest::Signed(params) = request else {
            return Err(BackendError::Unsupported("token-exchange"));
        };

        let body = json!({
            "shareid": params.shareid,
            "uk": params.uk,
            "sign": params.sign,
            "timestamp": params.timestamp,
            "fs_id": params.fs_id,
        });

        let value = self
            .http
            .post_json(&format!("{GATEWAY}/api/get-download"), &body)
            .await?;
        ensure_ok(&value)?;

        let dlink = value
            .get("downloadLink")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BackendError::UnexpectedPayload(
                    "gateway response carries no downloadLink".to_string(),
                )
            })?;

        Ok(LinkBundle::from_urls(mirror_variants(dlink)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_ok_accepts_true_or_absent() {
        assert!(ensure_ok(&json!({"ok": true})).is_ok());
        assert!(ensure_ok(&json!({"list": []})).is_ok());
    }

    #[test]
    fn test_ensure_ok_rejects_with_message() {
        let err =
            ensure_ok(&json!({"ok": false, "message": "share expired"}))
                .unwrap_err();
        match err {
            BackendError::UpstreamRejected { message, .. } => {
                assert_eq!(message, "share expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
