//! Domain-driven configuration management for Proctor
//!
//! Configuration is split by functional domain (server, database, simulation,
//! target, sandbox, auth, logging). Each domain carries its own defaults and
//! validation, and every field that operators commonly change can be
//! overridden through `PROCTOR_*` environment variables.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    auth::AuthConfig,
    database::DatabaseConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    sandbox::SandboxConfig,
    server::ServerConfig,
    simulation::SimulationConfig,
    target::TargetConfig,
    ProctorConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
