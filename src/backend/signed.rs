//! Mode 2: operator cookie plus signed-URL reconstruction.
//!
//! Metadata comes from the short-url info API authenticated with the
//! configured account cookie. Link generation takes the share URL and
//! bundles the signed `dlink` of every file in the listing, in listing
//! order; single-file shares additionally get CDN host variants.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::http::{UpstreamClient, ensure_errno};
use super::parser::extract_surl;
use super::traits::{BackendError, SessionStatus, ShareBackend};
use super::types::{
    FileManifest, LinkBundle, LinkRequest, ShareFile, field_string,
    mirror_variants,
};
use crate::config::Mode;

const BASE: &str = "https://www.terabox.com";
const APP_QUERY: &str = "app_id=250528&web=1&channel=dubox&clienttype=0";

pub struct SignedBackend {
    http: UpstreamClient,
    cookie: String,
}

impl SignedBackend {
    pub fn new(http: UpstreamClient, cookie: String) -> Self {
        Self { http, cookie }
    }

    async fn shorturl_info(&self, surl: &str) -> Result<Value, BackendError> {
        let value = self
            .http
            .get_json(
                &format!(
                    "{BASE}/api/shorturlinfo?{APP_QUERY}&shorturl=1{surl}&root=1"
                ),
                &[("Cookie", self.cookie.as_str())],
            )
            .await?;
        ensure_errno(&value)?;
        Ok(value)
    }
}

#[async_trait]
impl ShareBackend for SignedBackend {
    fn mode(&self) -> Mode {
        Mode::SignedUrl
    }

    async fn verify_session(&self) -> Result<SessionStatus, BackendError> {
        let value = self
            .http
            .get_json(
                &format!("{BASE}/rest/2.0/membership/proxy/user?method=query"),
                &[("Cookie", self.cookie.as_str())],
            )
            .await?;

        // A stale or malformed cookie yields an error payload without
        // member data rather than an HTTP failure
        let logged_in = value
            .get("error_code")
            .and_then(Value::as_i64)
            .unwrap_or(0)
            == 0
            && value.pointer("/data/member_info").is_some();

        Ok(SessionStatus { logged_in })
    }

    async fn resolve_file(
        &self,
        share_url: &str,
    ) -> Result<FileManifest, BackendError> {
        let surl = extract_surl(share_url).ok_or_else(|| {
            BackendError::InvalidShareUrl(share_url.to_string())
        })?;

        let info = self.shorturl_info(&surl).await?;
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
        let LinkRequest::ShareUrl(share_url) = request else {
            return Err(BackendError::Unsupported("signed-url"));
        };

        let surl = extract_surl(&share_url).ok_or_else(|| {
            BackendError::InvalidShareUrl(share_url.clone())
        })?;

        // With a logged-in cookie the listing already carries per-file
        // signed dlinks
        let info = self.shorturl_info(&surl).await?;
        let dlinks = collect_dlinks(&info);
        if dlinks.is_empty() {
            return Err(BackendError::UnexpectedPayload(
                "listing carries no dlink; the configured cookie may \
                 not hold a session"
                    .to_string(),
            ));
        }
        debug!(surl, files = dlinks.len(), "Reconstructed signed download links");

        // url_N keys stay one-per-file for multi-file shares; CDN host
        // variants only make sense when there is a single file
        let urls = if let [dlink] = dlinks.as_slice() {
            mirror_variants(dlink)
        } else {
            dlinks
        };

        Ok(LinkBundle::from_urls(urls))
    }
}

/// Signed dlinks for every file in the listing, in listing order.
/// Entries without a dlink (directories, expired entries) are skipped.
fn collect_dlinks(info: &Value) -> Vec<String> {
    info.get("list")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|entry| entry.get("dlink").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_dlinks_one_per_file_in_order() {
        let info = json!({
            "list": [
                {"fs_id": 1, "dlink": "https://d.terabox.com/file/a"},
                {"fs_id": 2, "dlink": "https://d.terabox.com/file/b"},
            ]
        });

        assert_eq!(
            collect_dlinks(&info),
            vec![
                "https://d.terabox.com/file/a".to_string(),
                "https://d.terabox.com/file/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_collect_dlinks_skips_entries_without_dlink() {
        let info = json!({
            "list": [
                {"fs_id": 1, "isdir": 1},
                {"fs_id": 2, "dlink": "https://d.terabox.com/file/b"},
            ]
        });

        assert_eq!(collect_dlinks(&info).len(), 1);
    }

    #[test]
    fn test_collect_dlinks_empty_without_listing() {
        assert!(collect_dlinks(&json!({})).is_empty());
        assert!(collect_dlinks(&json!({"list": []})).is_empty());
    }
}
