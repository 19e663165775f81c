//! Request-level error type shared by every controller.
//!
//! Client errors carry their message through to the response body. Database
//! and internal failures are logged in full and answered with a generic
//! message so storage details never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Deliberately carries no detail about which check failed.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Translation limit reached")]
    LimitReached { limit: i64, used: i64 },

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_api_key() -> Self {
        ApiError::Unauthorized("Invalid API Key".to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, json!({ "message": m })),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, json!({ "message": m })),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "message": m })),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "message": m })),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "message": m })),
            ApiError::LimitReached { limit, used } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "message": self.to_string(), "limit": limit, "used": used }),
            ),
            ApiError::Upstream(m) => {
                error!(message = %m, "upstream service error");
                (StatusCode::BAD_GATEWAY, json!({ "message": m }))
            }
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error" }),
                )
            }
            ApiError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
