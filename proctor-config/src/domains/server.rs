//! HTTP server configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to
    pub bind_address: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS middleware
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_cors: bool,

    /// Enable X-Request-ID propagation
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_request_id: bool,

    /// Enable per-request tracing spans
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3100,
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

impl ServerConfig {
    /// Socket address string suitable for `TcpListener::bind`
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        validate_positive(self.port, "port", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}
