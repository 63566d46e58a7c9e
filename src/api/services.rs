use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

use super::error::ApiError;
use super::models::{ConfigResponse, HealthResponse};
use super::state::AppState;
use super::validation;

/// API documentation index (GET /)
///
/// Returns the endpoint catalogue with absolute URLs derived from the
/// request's Host header (behind a proxy, from X-Forwarded-Proto).
pub async fn index(headers: HeaderMap) -> impl IntoResponse {
    let base_url = base_url(&headers);

    Json(json!({
        "status": "success",
        "endpoints": {
            "get_config": {
                "method": "GET",
                "url": format!("{base_url}/get_config"),
                "description": "Get current configuration"
            },
            "generate_file": {
                "method": "GET",
                "url": format!("{base_url}/generate_file"),
                "parameters": {"url": "Share URL"},
                "description": "Get file information from a share URL"
            },
            "generate_link": {
                "method": "GET",
                "url": format!("{base_url}/generate_link"),
                "parameters": {
                    "fs_id": "File ID",
                    "uk": "User ID",
                    "shareid": "Share ID",
                    "timestamp": "Timestamp",
                    "sign": "Signature",
                    "js_token": "Page token (mode 1 only)",
                    "cookie": "Cookie (mode 1 only)",
                    "url": "Share URL (mode 2 only)"
                },
                "description": "Generate download links"
            }
        }
    }))
}

fn base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

/// Current configuration with an upstream session check (GET /get_config)
///
/// Verifies the active backend's upstream session first. An unusable
/// session (typically a stale account cookie) yields an error payload that
/// still carries the mode, so callers know which strategy refused.
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = &state.config.upstream;
    let mode = upstream.mode;

    match state.backend.verify_session().await {
        Ok(status) if status.logged_in => {
            let body = ConfigResponse {
                status: "success".to_string(),
                mode: mode.as_u8(),
                cookie: upstream.cookie.clone(),
                user_id: upstream.user_id.clone(),
            };
            (StatusCode::OK, Json(json!(body)))
        }
        Ok(_) => {
            state.metrics.upstream_failure();
            warn!(%mode, "Upstream session check failed: cookie not logged in");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "status": "error",
                    "code": "INVALID_COOKIE",
                    "message": "Invalid upstream cookie",
                    "mode": mode.as_u8(),
                })),
            )
        }
        Err(err) => {
            state.metrics.upstream_failure();
            warn!(%mode, error = %err, "Upstream session check failed");
            let err = ApiError::from(err);
            (
                err.status_code(),
                Json(json!({
                    "status": "error",
                    "code": err.code(),
                    "message": err.to_string(),
                    "mode": mode.as_u8(),
                })),
            )
        }
    }
}

/// Resolve share-file metadata (GET /generate_file?url=...)
pub async fn generate_file(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let share_url = validation::share_url_from_query(&params)?;

    let manifest =
        state.backend.resolve_file(&share_url).await.map_err(|err| {
            state.metrics.upstream_failure();
            ApiError::from(err)
        })?;

    state.metrics.file_resolved();
    info!(
        mode = %state.backend.mode(),
        files = manifest.list.len(),
        "Resolved share metadata"
    );

    Ok((StatusCode::OK, Json(manifest)))
}

/// Produce direct download links (GET /generate_link)
///
/// Required parameters depend on the active mode; see
/// [`validation::link_request_from_query`].
pub async fn generate_link(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let mode = state.config.upstream.mode;
    let request = validation::link_request_from_query(mode, &params)?;

    let bundle =
        state.backend.generate_link(request).await.map_err(|err| {
            state.metrics.upstream_failure();
            ApiError::from(err)
        })?;

    state.metrics.link_generated();
    info!(%mode, links = bundle.download_link.len(), "Generated download links");

    Ok((StatusCode::OK, Json(bundle)))
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert("backend".to_string(), "healthy".to_string());

    // If we can respond, the router and the configured backend exist;
    // upstream reachability is only probed on /get_config

    let response = HealthResponse {
        status: "healthy".to_string(),
        mode: state.config.upstream.mode.as_u8(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}
