//! Sandbox process supervision interface

use async_trait::async_trait;
use proctor_core::{Result, SandboxProcessStatus};

/// Owner of the single sandbox server process of this host process.
///
/// Implementations are shared behind `Arc` by the composition root and the
/// control router; tests substitute fakes.
#[async_trait]
pub trait SandboxSupervisor: Send + Sync {
    /// Build, spawn and health-check the sandbox server. Idempotent while a
    /// process is live.
    async fn start(&self) -> Result<SandboxProcessStatus>;

    /// Kill the sandbox process group and clear the handle
    async fn stop(&self) -> Result<SandboxProcessStatus>;

    /// Pure read of the current state
    fn status(&self) -> SandboxProcessStatus;
}
