//! Domain-specific configuration modules

pub mod auth;
pub mod database;
pub mod logging;
pub mod sandbox;
pub mod server;
pub mod simulation;
pub mod target;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Proctor configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProctorConfig {
    /// HTTP server configuration
    pub server: server::ServerConfig,

    /// Database connection configuration
    pub database: database::DatabaseConfig,

    /// Safety gate configuration
    pub simulation: simulation::SimulationConfig,

    /// Address of the application API that virtual actors exercise
    pub target: target::TargetConfig,

    /// Sandbox server build and log locations
    pub sandbox: sandbox::SandboxConfig,

    /// Bearer credential verification
    pub auth: auth::AuthConfig,

    /// Logging configuration
    pub logging: logging::LoggingConfig,
}

impl ProctorConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.simulation.validate()?;
        self.target.validate()?;
        self.sandbox.validate()?;
        self.auth.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Base URL of the target application API, defaulting the port to the
    /// port this server listens on.
    pub fn target_base_url(&self) -> String {
        self.target.base_url(self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProctorConfig::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_target_base_url_follows_server_port() {
        let mut config = ProctorConfig::default();
        config.server.port = 4321;
        assert_eq!(config.target_base_url(), "http://127.0.0.1:4321");

        config.target.port = Some(9000);
        config.target.protocol = "https".to_string();
        assert_eq!(config.target_base_url(), "https://127.0.0.1:9000");
    }
}
