//! REST API error type
//!
//! Simulation failures render as
//! `{"error": {"code", "message", "status", "details"?}}` with the HTTP status
//! derived from the error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proctor_core::SimulationError;
use proctor_interfaces::StoreError;
use proctor_web::WebError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Web(#[from] WebError),
}

pub type RestResult<T> = Result<T, RestError>;

impl From<StoreError> for RestError {
    fn from(error: StoreError) -> Self {
        RestError::Simulation(error.into())
    }
}

impl RestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Simulation(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RestError::Web(e) => e.status_code(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RestError::Simulation(e) => e.kind(),
            RestError::Web(e) => e.error_code(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        RestError::Simulation(SimulationError::InvalidRequest(message.into()))
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        RestError::Simulation(SimulationError::InvalidOperation(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RestError::Simulation(SimulationError::NotFound(message.into()))
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(kind = self.code(), error = %self, "Request rejected");
        }

        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        if let RestError::Simulation(e) = &self {
            if let Some(details) = e.details() {
                error["details"] = details;
            }
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_kinds_map_to_status() {
        let error = RestError::from(SimulationError::AlreadyRunning { run_id: "r1".into() });
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
        assert_eq!(error.code(), "already_running");

        let error = RestError::from(SimulationError::SandboxNotRunning);
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let error = RestError::from(WebError::forbidden("Admin role required"));
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(error.code(), "forbidden");
    }

    #[test]
    fn test_store_errors_become_storage_errors() {
        let error = RestError::from(StoreError::Connection { message: "pool closed".into() });
        assert_eq!(error.code(), "storage_error");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
