//! Mode 1: anonymous session bootstrap against the share page.
//!
//! The strategy fetches the share page to obtain a browser session and the
//! embedded page token (`jsToken`), lists the share through the share-list
//! API, and generates links by posting the signed parameter tuple back with
//! the caller-provided cookie.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::http::{UpstreamClient, ensure_errno};
use super::parser::extract_surl;
use super::traits::{BackendError, SessionStatus, ShareBackend};
use super::types::{
    FileManifest, LinkBundle, LinkRequest, ShareFile, field_string,
    mirror_variants,
};
use crate::config::Mode;

const BASE: &str = "https://www.terabox.app";
const APP_QUERY: &str = "app_id=250528&web=1&channel=dubox&clienttype=0";
const PAGE_SIZE: usize = 100;

// The page embeds the token either URL-encoded inside a callback
// (`fn%28%22<token>%22%29`) or as a plain `fn("<token>")` call.
static JS_TOKEN_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fn%28%22([0-9A-Fa-f]+)%22%29").unwrap());
static JS_TOKEN_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"fn\("([0-9A-Fa-f]+)"\)"#).unwrap());

pub struct SessionBackend {
    http: UpstreamClient,
}

impl SessionBackend {
    pub fn new(http: UpstreamClient) -> Self {
        Self { http }
    }

    /// List one directory level of the share, paging until the upstream
    /// runs out of entries and recursing into subdirectories
    async fn list_dir(
        &self,
        surl: &str,
        js_token: &str,
        cookie: &str,
        dir: Option<&str>,
    ) -> Result<Vec<ShareFile>, BackendError> {
        let mut files = Vec::new();
        let mut page = 1u32;

        loop {
            let url = share_list_url(surl, js_token, page, dir);
            let value = self.http.get_json(&url, &[("Cookie", cookie)]).await?;
            ensure_errno(&value)?;

            let entries = value
                .get("list")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    BackendError::UnexpectedPayload(
                        "share list response has no list".to_string(),
                    )
                })?;
            let fetched = entries.len();

            for entry in entries {
                let Some(mut file) = ShareFile::from_upstream(entry) else {
                    warn!("Skipping share entry without fs_id/name");
                    continue;
                };
                if file.is_dir {
                    file.children = Box::pin(self.list_dir(
                        surl,
                        js_token,
                        cookie,
                        Some(&file.path),
                    ))
                    .await?;
                }
                files.push(file);
            }

            if !has_more_pages(&value, fetched) {
                break;
            }
            page += 1;
        }

        Ok(files)
    }
}

/// Build one share-list page request. Directory paths go through the URL's
/// query-pair encoder: share names may contain `&`, `#`, or `%`, which would
/// otherwise corrupt the query string.
fn share_list_url(
    surl: &str,
    js_token: &str,
    page: u32,
    dir: Option<&str>,
) -> String {
    let mut url = Url::parse(BASE).expect("share host url is valid");
    url.set_path("/share/list");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("app_id", "250528")
            .append_pair("web", "1")
            .append_pair("channel", "dubox")
            .append_pair("clienttype", "0")
            .append_pair("jsToken", js_token)
            .append_pair("page", &page.to_string())
            .append_pair("num", &PAGE_SIZE.to_string())
            .append_pair("by", "name")
            .append_pair("order", "asc")
            .append_pair("shorturl", &format!("1{surl}"));
        match dir {
            Some(path) => {
                pairs.append_pair("dir", path);
            }
            None => {
                pairs.append_pair("root", "1");
            }
        }
    }
    url.into()
}

/// Whether another page should be requested: trust the upstream's
/// `has_more` flag when present, otherwise treat a full page as more
fn has_more_pages(value: &Value, fetched: usize) -> bool {
    match value.get("has_more") {
        Some(flag) => {
            flag.as_i64() == Some(1) || flag.as_bool() == Some(true)
        }
        None => fetched == PAGE_SIZE,
    }
}

#[async_trait]
impl ShareBackend for SessionBackend {
    fn mode(&self) -> Mode {
        Mode::Session
    }

    async fn verify_session(&self) -> Result<SessionStatus, BackendError> {
        // Anonymous strategy: a reachable share host is a usable session
        self.http.get_page(BASE).await?;
        Ok(SessionStatus { logged_in: true })
    }

    async fn resolve_file(
        &self,
        share_url: &str,
    ) -> Result<FileManifest, BackendError> {
        let surl = extract_surl(share_url).ok_or_else(|| {
            BackendError::InvalidShareUrl(share_url.to_string())
        })?;

        let page = self
            .http
            .get_page(&format!("{BASE}/wap/share/filelist?surl={surl}"))
            .await?;
        let js_token = extract_js_token(&page.body).ok_or_else(|| {
            BackendError::UnexpectedPayload(
                "share page carries no jsToken".to_string(),
            )
        })?;
        let cookie = page.cookies.join("; ");
        debug!(surl, "Bootstrapped anonymous share session");

        let info = self
            .http
            .get_json(
                &format!(
                    "{BASE}/api/shorturlinfo?{APP_QUERY}&shorturl=1{surl}&root=1"
                ),
                &[("Cookie", cookie.as_str())],
            )
            .await?;
        ensure_errno(&info)?;

        let list = self.list_dir(&surl, &js_token, &cookie, None).await?;

        Ok(FileManifest {
            status: "success".to_string(),
            uk: field_string(&info, "uk"),
            shareid: field_string(&info, "shareid"),
            sign: field_string(&info, "sign"),
            timestamp: field_string(&info, "timestamp"),
            js_token: Some(js_token),
            cookie: Some(cookie),
            list,
        })
    }

    async fn generate_link(
        &self,
        request: LinkRequest,
    ) -> Result<LinkBundle, BackendError> {
        let LinkRequest::Signed(params) = request else {
            return Err(BackendError::Unsupported("session"));
        };

        let js_token = params.js_token.unwrap_or_default();
        let cookie = params.cookie.unwrap_or_default();

        let url = format!(
            "{BASE}/share/download?{APP_QUERY}&jsToken={js_token}\
             &uk={}&shareid={}&timestamp={}&sign={}",
            params.uk, params.shareid, params.timestamp, params.sign
        );
        let form = [
            ("product", "share".to_string()),
            ("nozip", "0".to_string()),
            ("fid_list", format!("[{}]", params.fs_id)),
            ("primaryid", params.shareid.clone()),
            ("uk", params.uk.clone()),
        ];

        let value = self
            .http
            .post_form_json(&url, &form, &[("Cookie", cookie.as_str())])
            .await?;
        ensure_errno(&value)?;

        let dlink = value
            .pointer("/dlink")
            .or_else(|| value.pointer("/list/0/dlink"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BackendError::UnexpectedPayload(
                    "download response carries no dlink".to_string(),
                )
            })?;

        Ok(LinkBundle::from_urls(mirror_variants(dlink)))
    }
}

fn extract_js_token(body: &str) -> Option<String> {
    JS_TOKEN_ENCODED
        .captures(body)
        .or_else(|| JS_TOKEN_PLAIN.captures(body))
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_js_token_encoded() {
        let body = "window.jsToken = decodeURIComponent('fn%28%22AB12cd%22%29');";
        assert_eq!(extract_js_token(body).as_deref(), Some("AB12cd"));
    }

    #[test]
    fn test_extract_js_token_plain() {
        let body = r#"callback fn("DEADBEEF01") trailing"#;
        assert_eq!(extract_js_token(body).as_deref(), Some("DEADBEEF01"));
    }

    #[test]
    fn test_extract_js_token_absent() {
        assert_eq!(extract_js_token("<html>no token here</html>"), None);
    }

    #[test]
    fn test_share_list_url_root() {
        let url = share_list_url("abcDEF", "tok", 1, None);
        assert!(url.starts_with("https://www.terabox.app/share/list?"));
        assert!(url.contains("shorturl=1abcDEF"));
        assert!(url.contains("root=1"));
        assert!(url.contains("page=1"));
        assert!(!url.contains("dir="));
    }

    #[test]
    fn test_share_list_url_encodes_directory() {
        let url =
            share_list_url("abcDEF", "tok", 2, Some("/a&b#c/100% hits"));

        // Reserved characters must not survive raw: `&` would split the
        // path into bogus parameters and `#` would truncate the query
        assert!(url.contains("dir=%2Fa%26b%23c%2F100%25+hits"));
        assert!(!url.contains('#'));
        assert!(!url.contains("/a&b"));
        assert!(url.contains("page=2"));
    }

    #[test]
    fn test_has_more_pages_uses_flag_when_present() {
        assert!(has_more_pages(&serde_json::json!({"has_more": 1}), 3));
        assert!(has_more_pages(&serde_json::json!({"has_more": true}), 3));
        assert!(!has_more_pages(
            &serde_json::json!({"has_more": 0}),
            PAGE_SIZE
        ));
    }

    #[test]
    fn test_has_more_pages_falls_back_to_page_fill() {
        assert!(has_more_pages(&serde_json::json!({}), PAGE_SIZE));
        assert!(!has_more_pages(&serde_json::json!({}), PAGE_SIZE - 1));
        assert!(!has_more_pages(&serde_json::json!({}), 0));
    }
}
