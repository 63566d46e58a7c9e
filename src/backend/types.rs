//! Shared backend types: resolved manifests, link bundles, and the
//! mode-specific link request payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolved share metadata returned by `generate_file`.
///
/// Mirrors the upstream share identity (uk/shareid/sign/timestamp) plus the
/// file tree. The session strategy additionally carries the page token and
/// bootstrap cookie so the caller can feed them back into `generate_link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileManifest {
    pub status: String,
    pub uk: String,
    pub shareid: String,
    pub sign: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    pub list: Vec<ShareFile>,
}

/// One entry in a resolved share listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareFile {
    pub fs_id: String,
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ShareFile>,
}

impl ShareFile {
    /// Build an entry from an upstream JSON object.
    ///
    /// Upstream payloads are loosely typed: numeric fields arrive as numbers
    /// or strings depending on the API, directory flags as 0/1 integers or
    /// "0"/"1" strings, and the file name under several different keys.
    /// Nested listings (gateway responses inline directory contents) are
    /// parsed recursively.
    pub fn from_upstream(entry: &Value) -> Option<Self> {
        let fs_id = entry.get("fs_id").and_then(json_string)?;
        let name = entry
            .get("server_filename")
            .or_else(|| entry.get("filename"))
            .or_else(|| entry.get("name"))
            .and_then(Value::as_str)?
            .to_string();
        let path = entry
            .get("path")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| name.clone());
        let is_dir = entry
            .get("isdir")
            .or_else(|| entry.get("is_dir"))
            .map(json_truthy)
            .unwrap_or(false);
        let size = entry.get("size").and_then(Value::as_u64).unwrap_or(0);
        let kind = if is_dir { "folder" } else { classify(&name) };
        let thumbnail = entry
            .pointer("/thumbs/url3")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let children = entry
            .get("list")
            .or_else(|| entry.get("children"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_upstream).collect())
            .unwrap_or_default();

        Some(Self {
            fs_id,
            name,
            path,
            is_dir,
            size,
            kind: kind.to_string(),
            thumbnail,
            children,
        })
    }
}

/// Generated download links, keyed url_1, url_2, ... in preference order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkBundle {
    pub status: String,
    pub download_link: BTreeMap<String, String>,
}

impl LinkBundle {
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let download_link = urls
            .into_iter()
            .enumerate()
            .map(|(i, url)| (format!("url_{}", i + 1), url))
            .collect();

        Self {
            status: "success".to_string(),
            download_link,
        }
    }
}

/// Validated `generate_link` parameters, shaped by the active mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRequest {
    /// Signed tuple (modes 1 and 3; mode 1 adds the page token and cookie)
    Signed(SignedLinkParams),
    /// Share URL (mode 2 reconstructs the signed link itself)
    ShareUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLinkParams {
    pub fs_id: String,
    pub uk: String,
    pub shareid: String,
    pub timestamp: String,
    pub sign: String,
    pub js_token: Option<String>,
    pub cookie: Option<String>,
}

/// Direct link plus CDN host variants, deduplicated
pub fn mirror_variants(dlink: &str) -> Vec<String> {
    let mut urls = vec![dlink.to_string()];
    let alt = dlink.replacen("://d.", "://d3.", 1);
    if alt != dlink {
        urls.push(alt);
    }
    urls
}

/// Coarse media classification from the file extension
pub fn classify(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "mov" | "m4v" | "mkv" | "asf" | "avi" | "wmv" | "m2ts"
        | "3g2" | "webm" => "video",
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "heic" | "bmp" => {
            "image"
        }
        "pdf" | "doc" | "docx" | "txt" | "zip" | "rar" | "7z" | "apk"
        | "exe" => "file",
        _ => "other",
    }
}

/// Stringify a JSON scalar that may be a number or a string
pub(crate) fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1" || s == "true",
        _ => false,
    }
}

/// Stringified field lookup with an empty-string fallback
pub(crate) fn field_string(value: &Value, key: &str) -> String {
    value.get(key).and_then(json_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_share_file_from_upstream_numeric_fields() {
        let entry = json!({
            "fs_id": 123456789u64,
            "server_filename": "movie.mp4",
            "path": "/share/movie.mp4",
            "isdir": 0,
            "size": 1024,
            "thumbs": {"url3": "https://cdn.example.com/thumb.jpg"}
        });

        let file = ShareFile::from_upstream(&entry).unwrap();
        assert_eq!(file.fs_id, "123456789");
        assert_eq!(file.name, "movie.mp4");
        assert_eq!(file.kind, "video");
        assert!(!file.is_dir);
        assert_eq!(file.size, 1024);
        assert_eq!(
            file.thumbnail.as_deref(),
            Some("https://cdn.example.com/thumb.jpg")
        );
    }

    #[test]
    fn test_share_file_from_upstream_string_fields() {
        let entry = json!({
            "fs_id": "987",
            "filename": "photos",
            "isdir": "1",
            "list": [
                {"fs_id": "988", "name": "a.jpg", "isdir": "0", "size": 10}
            ]
        });

        let file = ShareFile::from_upstream(&entry).unwrap();
        assert!(file.is_dir);
        assert_eq!(file.kind, "folder");
        assert_eq!(file.children.len(), 1);
        assert_eq!(file.children[0].kind, "image");
    }

    #[test]
    fn test_share_file_rejects_entry_without_identity() {
        assert!(ShareFile::from_upstream(&json!({"name": "x"})).is_none());
        assert!(ShareFile::from_upstream(&json!({"fs_id": 1})).is_none());
    }

    #[test]
    fn test_link_bundle_key_order() {
        let bundle = LinkBundle::from_urls(vec![
            "https://d.terabox.app/file/a".to_string(),
            "https://d3.terabox.app/file/a".to_string(),
        ]);

        let keys: Vec<_> = bundle.download_link.keys().cloned().collect();
        assert_eq!(keys, vec!["url_1", "url_2"]);
        assert_eq!(bundle.status, "success");
    }

    #[test]
    fn test_mirror_variants() {
        let urls = mirror_variants("https://d.terabox.app/file/a?sign=x");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "https://d3.terabox.app/file/a?sign=x");

        // No CDN host to rewrite, no variant
        let urls = mirror_variants("https://cdn.example.com/file/a");
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("clip.MP4"), "video");
        assert_eq!(classify("photo.jpeg"), "image");
        assert_eq!(classify("archive.zip"), "file");
        assert_eq!(classify("noextension"), "other");
    }
}
