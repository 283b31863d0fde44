use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::redline::RedlineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// 401 from the backend. The cached credential has already been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 from the backend. The session stays signed in.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Backend timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RedlineError> for AppError {
    fn from(err: RedlineError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized(message) => AppError::Unauthorized(message),
            BackendError::Forbidden(message) => AppError::Forbidden(message),
            BackendError::Api { status, message } => AppError::Backend { status, message },
            BackendError::Timeout(budget) => {
                AppError::Timeout(format!("no response within {}s", budget.as_secs()))
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Backend { status, message } => {
                tracing::error!("Backend error {status}: {message}");
                // Backend detail messages are meant for the user; pass them through.
                (StatusCode::BAD_GATEWAY, "BACKEND_ERROR", message.clone())
            }
            AppError::Timeout(msg) => {
                tracing::error!("Backend timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "BACKEND_TIMEOUT", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
