//! Web-specific error type
//!
//! Errors raised by middleware before a request reaches a handler. They render
//! with the same `{"error": {...}}` envelope the control endpoints use.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Internal { message: String },
}

pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            WebError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code carried in the error body
    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::BadRequest { .. } => "invalid_request",
            WebError::Unauthorized { .. } => "unauthorized",
            WebError::Forbidden { .. } => "forbidden",
            WebError::NotFound { .. } => "not_found",
            WebError::Internal { .. } => "internal_error",
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        WebError::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        WebError::Forbidden { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        WebError::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        WebError::Internal { message: message.into() }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}
