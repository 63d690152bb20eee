//! Run engine for sandbox load simulations
//!
//! A run is a detached task that drives a fleet of virtual actors against the
//! application API until its deadline passes or it is cancelled, flushing
//! progress to the run store as it goes and finalizing the persisted run
//! exactly once.

mod actor;
pub mod engine;
pub mod registry;
pub mod scenario;
mod task;

pub use engine::{EngineTiming, SimulationEngine, DEFAULT_SHUTDOWN_GRACE};
pub use registry::{RunHandle, RunRegistry};
pub use scenario::ActionKind;
