//! Share URL parsing

use reqwest::Url;

/// Extract the short-url code from a share URL.
///
/// Accepts both the path form (`https://terabox.com/s/1AbCdEf`, where the
/// leading `1` is a URL-format marker, not part of the code) and the query
/// form (`...?surl=AbCdEf`). Returns `None` for non-http(s) URLs or URLs
/// without a recognizable code.
pub fn extract_surl(share_url: &str) -> Option<String> {
    let url = Url::parse(share_url).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    if let Some(surl) = url
        .query_pairs()
        .find(|(key, _)| key == "surl")
        .map(|(_, value)| value.into_owned())
    {
        if !surl.is_empty() {
            return Some(surl);
        }
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    for (i, segment) in segments.iter().enumerate() {
        if *segment == "s" {
            if let Some(code) = segments.get(i + 1) {
                let code = code.strip_prefix('1').unwrap_or(code);
                if !code.is_empty() {
                    return Some(code.to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_surl_path_form() {
        assert_eq!(
            extract_surl("https://terabox.com/s/1AbCdEf").as_deref(),
            Some("AbCdEf")
        );
        assert_eq!(
            extract_surl("https://www.1024terabox.com/s/1xy-z_9").as_deref(),
            Some("xy-z_9")
        );
    }

    #[test]
    fn test_extract_surl_query_form() {
        assert_eq!(
            extract_surl("https://terabox.app/sharing/link?surl=AbCdEf")
                .as_deref(),
            Some("AbCdEf")
        );
    }

    #[test]
    fn test_extract_surl_rejects_garbage() {
        assert_eq!(extract_surl("not a url"), None);
        assert_eq!(extract_surl("ftp://terabox.com/s/1abc"), None);
        assert_eq!(extract_surl("https://terabox.com/"), None);
        assert_eq!(extract_surl("https://terabox.com/s/"), None);
    }
}
