//! Safety gate configuration for destructive load simulations

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Default marker identifying a sandbox database
pub const DEFAULT_SANDBOX_MARKER: &str = "sandbox";

/// Simulation safety configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Explicit opt-in for destructive simulations in this process
    #[serde(default = "crate::domains::utils::default_false")]
    pub enabled: bool,

    /// Substring that positively identifies a sandbox database
    pub marker: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            marker: DEFAULT_SANDBOX_MARKER.to_string(),
        }
    }
}

impl Validatable for SimulationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.marker.trim().is_empty() {
            return Err(self.validation_error("marker cannot be empty when simulations are enabled"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "simulation"
    }
}
