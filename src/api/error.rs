use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use super::validation::QueryValidationError;
use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidQuery(QueryValidationError),
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::UpstreamRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery(
                QueryValidationError::MissingParameters(_)
                | QueryValidationError::MissingUrl,
            ) => "MISSING_PARAMETERS",
            ApiError::InvalidQuery(QueryValidationError::InvalidShareUrl(_)) => {
                "INVALID_SHARE_URL"
            }
            ApiError::Upstream(_) => "UPSTREAM_FAILED",
            ApiError::UpstreamRejected(_) => "UPSTREAM_REJECTED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: "error",
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<QueryValidationError> for ApiError {
    fn from(value: QueryValidationError) -> Self {
        ApiError::InvalidQuery(value)
    }
}

impl From<BackendError> for ApiError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::InvalidShareUrl(url) => ApiError::InvalidQuery(
                QueryValidationError::InvalidShareUrl(url),
            ),
            BackendError::UpstreamRejected { .. } => {
                ApiError::UpstreamRejected(value.to_string())
            }
            BackendError::Upstream(_) | BackendError::UnexpectedPayload(_) => {
                ApiError::Upstream(value.to_string())
            }
            BackendError::Unsupported(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err: ApiError =
            QueryValidationError::MissingParameters(vec!["uk".into()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "MISSING_PARAMETERS");

        let err: ApiError = BackendError::Upstream("timeout".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError =
            BackendError::InvalidShareUrl("x".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_SHARE_URL");
    }
}
