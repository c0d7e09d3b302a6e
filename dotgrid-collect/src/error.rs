//! Error types for dotgrid-collect
//!
//! Validation failures are returned to the caller verbatim. Storage failures
//! are logged with full detail and answered with a generic message, so no
//! engine error text reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or query (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong admin token (403)
    #[error("Admin access required")]
    Forbidden,

    /// dotgrid-common error
    #[error(transparent)]
    Common(#[from] dotgrid_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use dotgrid_common::Error as E;

        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Admin access required".to_string(),
            ),
            ApiError::Common(E::Validation(err)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::Common(E::Consistency(detail)) => {
                error!("Partial submission write: {}", detail);
                let body = Json(json!({
                    "success": false,
                    "code": "CONSISTENCY_ERROR",
                    "error": "Pattern was stored but the contribution was not credited. Do not resubmit.",
                    "submissionStored": true,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            ApiError::Common(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "code": code,
            "error": message,
        }));

        (status, body).into_response()
    }
}
