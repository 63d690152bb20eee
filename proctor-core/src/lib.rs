//! Core domain models and types for Proctor
//!
//! This crate defines the language of the load-simulation orchestrator: run
//! records and their configuration, the live progress state of a run, the
//! sandbox process status, the safety gate that decides whether destructive
//! simulations may run at all, and the error taxonomy every other crate maps
//! onto.

pub mod error;
pub mod live;
pub mod request;
pub mod run;
pub mod safety;
pub mod sandbox;
pub mod template;

// Re-export commonly used types at the crate root
pub use error::{Result, SimulationError};
pub use live::{ActionStats, LiveSimulationState};
pub use request::{Scenario, SimulationLimits, SimulationRunConfig, StartSimulationRequest, StopSimulationRequest};
pub use run::{RecentAction, RunStatus, SimulationRun, RECENT_ACTIONS_LIMIT};
pub use safety::{resolve_database_name, SafetyDiagnosis, SafetyGate};
pub use sandbox::SandboxProcessStatus;
pub use template::{strip_identity_fields, ReportTemplate};
