//! Interfaces that decouple the simulation engine and control router from
//! concrete storage, process supervision and credential issuance, so tests can
//! substitute in-memory or fake implementations.

pub mod credentials;
pub mod database;
pub mod sandbox;

pub use credentials::{ActorCredentials, ActorRole, CredentialError};
pub use database::{RunStore, StoreError, TemplateStore};
pub use sandbox::SandboxSupervisor;
