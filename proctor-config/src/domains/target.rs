//! Target application API addressing

use crate::error::ConfigResult;
use crate::validation::{validate_enum_choice, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Protocol/host/port triple addressing the application API under load
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// "http" or "https"
    pub protocol: String,

    pub host: String,

    /// Defaults to the port of this server when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: None,
        }
    }
}

impl TargetConfig {
    /// Render the base URL, using `default_port` when no port is configured
    pub fn base_url(&self, default_port: u16) -> String {
        format!(
            "{}://{}:{}",
            self.protocol,
            self.host,
            self.port.unwrap_or(default_port)
        )
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_enum_choice(&self.protocol, &["http", "https"], "protocol", self.domain_name())?;
        validate_required_string(&self.host, "host", self.domain_name())?;
        if self.port == Some(0) {
            return Err(self.validation_error("port must be greater than 0"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}
