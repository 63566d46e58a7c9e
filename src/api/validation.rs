//! Query-parameter validation for the resolve and link endpoints.
//!
//! Which parameters `generate_link` requires depends on the active mode:
//! the signed tuple for modes 1 and 3 (mode 1 additionally needs the page
//! token and bootstrap cookie), the share URL for mode 2. A single error
//! names every missing parameter.

use std::collections::HashMap;
use thiserror::Error;

use crate::backend::{LinkRequest, SignedLinkParams};
use crate::config::Mode;

const SIGNED_PARAMS: [&str; 5] = ["fs_id", "uk", "shareid", "timestamp", "sign"];
const SESSION_EXTRA: [&str; 2] = ["js_token", "cookie"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryValidationError {
    #[error("Missing parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),
    #[error("URL parameter is required")]
    MissingUrl,
    #[error("invalid share url: {0}")]
    InvalidShareUrl(String),
}

/// Extract and sanity-check the share URL for `generate_file`
pub fn share_url_from_query(
    params: &HashMap<String, String>,
) -> Result<String, QueryValidationError> {
    let url = params
        .get("url")
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(QueryValidationError::MissingUrl)?;

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(QueryValidationError::InvalidShareUrl(url.to_string()));
    }

    Ok(url.to_string())
}

/// Build the mode-shaped link request from the query string
pub fn link_request_from_query(
    mode: Mode,
    params: &HashMap<String, String>,
) -> Result<LinkRequest, QueryValidationError> {
    match mode {
        Mode::SignedUrl => {
            let url = share_url_from_query(params)?;
            Ok(LinkRequest::ShareUrl(url))
        }
        Mode::Session | Mode::TokenExchange => {
            let mut required: Vec<&str> = SIGNED_PARAMS.to_vec();
            if mode == Mode::Session {
                required.extend(SESSION_EXTRA);
            }

            let missing: Vec<String> = required
                .iter()
                .filter(|name| {
                    params
                        .get(**name)
                        .map(String::as_str)
                        .unwrap_or("")
                        .is_empty()
                })
                .map(|name| name.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(QueryValidationError::MissingParameters(missing));
            }

            let get = |name: &str| params[name].clone();
            Ok(LinkRequest::Signed(SignedLinkParams {
                fs_id: get("fs_id"),
                uk: get("uk"),
                shareid: get("shareid"),
                timestamp: get("timestamp"),
                sign: get("sign"),
                js_token: params.get("js_token").cloned(),
                cookie: params.get("cookie").cloned(),
            }))
        }
    }
}
