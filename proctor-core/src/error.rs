//! Error taxonomy for simulation control
//!
//! Every failure that can reach an API caller is a [`SimulationError`]. The
//! machine-readable [`kind`](SimulationError::kind) is what clients match on;
//! the HTTP layer only translates kinds into status codes.

use crate::sandbox::SandboxProcessStatus;
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Core error type for simulation control
#[derive(Debug, Clone, Error)]
pub enum SimulationError {
    #[error("Load simulations are not allowed against database '{db_identity}' ({connection_string})")]
    NotAllowed {
        db_identity: String,
        connection_string: String,
    },

    #[error("A simulation run is already in progress: {run_id}")]
    AlreadyRunning { run_id: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Sandbox server is not running")]
    SandboxNotRunning,

    #[error("Failed to reach sandbox server: {message}")]
    SandboxProxyFailed {
        message: String,
        sandbox: Box<SandboxProcessStatus>,
    },

    #[error("Sandbox server build failed: {output}")]
    BuildFailed {
        output: String,
        exit_code: Option<i32>,
        signal: Option<i32>,
    },

    #[error("Sandbox server build artifact not found at {path}")]
    MissingBuild { path: String },

    #[error("Sandbox server at {base_url} did not become healthy within {timeout_secs} seconds")]
    HealthCheckTimeout { base_url: String, timeout_secs: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimulationError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::NotAllowed { .. } => "simulation_not_allowed",
            SimulationError::AlreadyRunning { .. } => "already_running",
            SimulationError::NotFound(_) => "not_found",
            SimulationError::InvalidRequest(_) => "invalid_request",
            SimulationError::InvalidOperation(_) => "invalid_operation",
            SimulationError::SandboxNotRunning => "sandbox_server_not_running",
            SimulationError::SandboxProxyFailed { .. } => "sandbox_proxy_failed",
            SimulationError::BuildFailed { .. } => "sandbox_server_build_failed",
            SimulationError::MissingBuild { .. } => "sandbox_server_missing_build",
            SimulationError::HealthCheckTimeout { .. } => "sandbox_health_check_timeout",
            SimulationError::Storage(_) => "storage_error",
            SimulationError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SimulationError::NotAllowed { .. } => 403,
            SimulationError::AlreadyRunning { .. } => 409,
            SimulationError::NotFound(_) => 404,
            SimulationError::InvalidRequest(_) | SimulationError::InvalidOperation(_) => 400,
            SimulationError::SandboxNotRunning => 503,
            SimulationError::SandboxProxyFailed { .. } => 502,
            SimulationError::HealthCheckTimeout { .. } => 504,
            SimulationError::BuildFailed { .. }
            | SimulationError::MissingBuild { .. }
            | SimulationError::Storage(_)
            | SimulationError::Internal(_) => 500,
        }
    }

    /// Structured context attached to the error body, if any
    pub fn details(&self) -> Option<Value> {
        match self {
            SimulationError::NotAllowed {
                db_identity,
                connection_string,
            } => Some(json!({
                "dbIdentity": db_identity,
                "connectionString": connection_string,
            })),
            SimulationError::AlreadyRunning { run_id } => Some(json!({ "runId": run_id })),
            SimulationError::SandboxProxyFailed { sandbox, .. } => Some(json!({ "sandbox": sandbox })),
            SimulationError::BuildFailed {
                exit_code, signal, ..
            } => Some(json!({ "exitCode": exit_code, "signal": signal })),
            SimulationError::MissingBuild { path } => Some(json!({ "path": path })),
            SimulationError::HealthCheckTimeout {
                base_url,
                timeout_secs,
            } => Some(json!({ "baseUrl": base_url, "timeoutSecs": timeout_secs })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_status_codes() {
        let cases: Vec<(SimulationError, &str, u16)> = vec![
            (
                SimulationError::NotAllowed {
                    db_identity: "proctor".into(),
                    connection_string: "sqlite://data/proctor.db".into(),
                },
                "simulation_not_allowed",
                403,
            ),
            (
                SimulationError::AlreadyRunning { run_id: "r1".into() },
                "already_running",
                409,
            ),
            (SimulationError::NotFound("run".into()), "not_found", 404),
            (SimulationError::InvalidRequest("x".into()), "invalid_request", 400),
            (SimulationError::InvalidOperation("x".into()), "invalid_operation", 400),
            (SimulationError::SandboxNotRunning, "sandbox_server_not_running", 503),
            (
                SimulationError::SandboxProxyFailed {
                    message: "refused".into(),
                    sandbox: Box::new(SandboxProcessStatus::idle(3101)),
                },
                "sandbox_proxy_failed",
                502,
            ),
            (
                SimulationError::BuildFailed {
                    output: "boom".into(),
                    exit_code: Some(1),
                    signal: None,
                },
                "sandbox_server_build_failed",
                500,
            ),
            (
                SimulationError::MissingBuild { path: "target/x".into() },
                "sandbox_server_missing_build",
                500,
            ),
            (
                SimulationError::HealthCheckTimeout {
                    base_url: "http://127.0.0.1:3101".into(),
                    timeout_secs: 30,
                },
                "sandbox_health_check_timeout",
                504,
            ),
            (SimulationError::Storage("db".into()), "storage_error", 500),
            (SimulationError::Internal("oops".into()), "internal_error", 500),
        ];

        for (error, kind, status) in cases {
            assert_eq!(error.kind(), kind);
            assert_eq!(error.status_code(), status, "status for {}", kind);
        }
    }

    #[test]
    fn test_not_allowed_message_names_database() {
        let error = SimulationError::NotAllowed {
            db_identity: "proctor".into(),
            connection_string: "sqlite://data/proctor.db".into(),
        };
        let message = error.to_string();
        assert!(message.contains("proctor"));
        assert!(message.contains("sqlite://data/proctor.db"));
        assert_eq!(error.details().unwrap()["dbIdentity"], "proctor");
    }
}
