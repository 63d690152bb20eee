//! Sandbox process supervision
//!
//! The sandbox is a second instance of the server binary, started on a fixed
//! port against a fixed disposable database, with destructive simulations
//! enabled. [`SandboxProcessManager`] builds it, spawns it detached, waits for
//! it to report healthy and tears down its whole process group on stop.

mod build;
pub mod manager;
mod process;

pub use manager::{HealthCheckPolicy, SandboxManagerConfig, SandboxProcessManager};

/// Port the sandbox server always listens on
pub const SANDBOX_PORT: u16 = 3101;

/// Database the sandbox server always uses
pub const SANDBOX_DATABASE_URL: &str = "sqlite://data/proctor_sandbox.db?mode=rwc";

/// Log file names created inside the configured log directory
pub const STDOUT_LOG_FILE: &str = "sandbox-server.out.log";
pub const STDERR_LOG_FILE: &str = "sandbox-server.err.log";
