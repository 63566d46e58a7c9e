//! HTTP client for talking to the upstream file-sharing service

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::traits::BackendError;
use crate::config::HttpConfig;

/// A share-page fetch result: the post-redirect URL, any cookies the
/// upstream issued, and the page body
#[derive(Debug)]
pub struct PageResponse {
    pub final_url: String,
    pub cookies: Vec<String>,
    pub body: String,
}

/// Thin wrapper around a shared [`reqwest::Client`] with the timeouts,
/// user agent, cookie store, and redirect policy all backends need.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &HttpConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| BackendError::Upstream(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET a JSON endpoint
    pub async fn get_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Value, BackendError> {
        debug!(url, "GET upstream json");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Upstream(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        Ok(response.json().await?)
    }

    /// POST a form body and read a JSON response
    pub async fn post_form_json(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Value, BackendError> {
        debug!(url, "POST upstream form");

        let mut request = self.client.post(url).form(form);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Upstream(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        Ok(response.json().await?)
    }

    /// POST a JSON body and read a JSON response
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<Value, BackendError> {
        debug!(url, "POST upstream json");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Upstream(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        Ok(response.json().await?)
    }

    /// GET a page, following redirects, returning the final URL, the
    /// `Set-Cookie` values from the final response, and the body
    pub async fn get_page(&self, url: &str) -> Result<PageResponse, BackendError> {
        debug!(url, "GET upstream page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Upstream(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        let final_url = response.url().to_string();
        let cookies = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::to_owned)
            .collect();
        let body = response.text().await?;

        Ok(PageResponse {
            final_url,
            cookies,
            body,
        })
    }
}

/// Reject payloads the upstream flagged with a non-zero `errno`
pub fn ensure_errno(value: &Value) -> Result<(), BackendError> {
    match value.get("errno").and_then(Value::as_i64) {
        Some(0) | None => Ok(()),
        Some(errno) => Err(BackendError::UpstreamRejected {
            errno,
            message: value
                .get("errmsg")
                .or_else(|| value.get("show_msg"))
                .and_then(Value::as_str)
                .unwrap_or("upstream rejected the request")
                .to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure_errno_accepts_zero_or_absent() {
        assert!(ensure_errno(&json!({"errno": 0, "list": []})).is_ok());
        assert!(ensure_errno(&json!({"list": []})).is_ok());
    }

    #[test]
    fn test_ensure_errno_rejects_with_message() {
        let err =
            ensure_errno(&json!({"errno": -9, "errmsg": "file not exists"}))
                .unwrap_err();
        match err {
            BackendError::UpstreamRejected { errno, message } => {
                assert_eq!(errno, -9);
                assert_eq!(message, "file not exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
