//! Proctor server
//!
//! Composition root: wires configuration, storage, the safety gate, the run
//! engine, the sandbox supervisor and the control router into one process.
//! The same binary runs as the primary server and, launched by the sandbox
//! supervisor with an isolated database, as the sandbox server.

pub mod services;
pub mod startup;

pub use services::ServiceContainer;
pub use startup::Server;
