//! Configuration loading and environment variable handling

use crate::domains::ProctorConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "PROCTOR".to_string(),
        }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ProctorConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: ProctorConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<ProctorConfig> {
        let mut config = ProctorConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<ProctorConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut ProctorConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server)?;
        self.apply_database_overrides(&mut config.database)?;
        self.apply_simulation_overrides(&mut config.simulation)?;
        self.apply_target_overrides(&mut config.target)?;
        self.apply_sandbox_overrides(&mut config.sandbox)?;
        self.apply_auth_overrides(&mut config.auth)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Ok(bind) = self.get_env_var("BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Ok(port) = self.get_env_var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid PORT: {}", e)))?;
        }

        Ok(())
    }

    fn apply_database_overrides(
        &self,
        config: &mut crate::domains::database::DatabaseConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("DATABASE_URL") {
            config.url = url;
        }

        Ok(())
    }

    fn apply_simulation_overrides(
        &self,
        config: &mut crate::domains::simulation::SimulationConfig,
    ) -> ConfigResult<()> {
        if let Ok(enabled) = self.get_env_var("SIMULATION_ENABLED") {
            config.enabled = parse_flag(&enabled)
                .ok_or_else(|| ConfigError::EnvError(format!("Invalid SIMULATION_ENABLED: {}", enabled)))?;
        }

        if let Ok(marker) = self.get_env_var("SIMULATION_MARKER") {
            config.marker = marker;
        }

        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(protocol) = self.get_env_var("TARGET_PROTOCOL") {
            config.protocol = protocol.to_lowercase();
        }

        if let Ok(host) = self.get_env_var("TARGET_HOST") {
            config.host = host;
        }

        if let Ok(port) = self.get_env_var("TARGET_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid TARGET_PORT: {}", e)))?;
            config.port = Some(port);
        }

        Ok(())
    }

    fn apply_sandbox_overrides(
        &self,
        config: &mut crate::domains::sandbox::SandboxConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_dir) = self.get_env_var("SANDBOX_LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }

        Ok(())
    }

    fn apply_auth_overrides(
        &self,
        config: &mut crate::domains::auth::AuthConfig,
    ) -> ConfigResult<()> {
        if let Ok(secret) = self.get_env_var("JWT_SECRET") {
            config.jwt_secret = secret;
        }

        if let Ok(issuer) = self.get_env_var("JWT_ISSUER") {
            config.issuer = issuer;
        }

        if let Ok(audience) = self.get_env_var("JWT_AUDIENCE") {
            config.audience = audience;
        }

        if let Ok(require) = self.get_env_var("REQUIRE_AUTH") {
            config.require_auth = parse_flag(&require)
                .ok_or_else(|| ConfigError::EnvError(format!("Invalid REQUIRE_AUTH: {}", require)))?;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts the usual spellings of a boolean switch
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
