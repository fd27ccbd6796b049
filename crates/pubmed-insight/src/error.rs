//! Error types for the PubMed Insight server.
//!
//! Uses `thiserror` for structured error handling with automatic `From`
//! implementations. Upstream failures are never retried; they surface to the
//! HTTP layer as a single generic server error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors from the upstream HTTP clients (E-utilities, iCite, LLM).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx upstream status.
    #[error("Upstream status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// JSON envelope parsing error (esearch, iCite, LLM responses).
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML document (the whole efetch call fails).
    #[error("Malformed XML response: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl ClientError {
    /// Create a status error from an upstream response code and body.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }
}

/// Errors surfaced at the API boundary.
///
/// Any unrecovered pipeline failure maps to a generic 500; the cause is
/// logged but not leaked to the client.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Upstream search or fetch failure.
    #[error("Upstream failure: {0}")]
    Upstream(#[from] ClientError),

    /// Requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Upstream(cause) => {
                tracing::error!(error = %cause, "upstream failure in request pipeline");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type alias for upstream client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::status(502, "bad gateway");
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_api_error_from_client_error() {
        let err: ApiError = ClientError::status(500, "boom").into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("paper not found");
        assert_eq!(err.to_string(), "Not found: paper not found");
    }
}
