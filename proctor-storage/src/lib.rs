//! Storage for simulation runs and report templates
//!
//! Two implementations of each store are provided: a SeaORM-backed one used by
//! the server binary, and an in-memory one used by tests and by callers that
//! do not need durable history.

pub mod connection;
pub mod entities;
pub mod memory;
pub mod migrations;
pub mod repositories;

pub use connection::{DatabaseConnection, DatabaseError};
pub use memory::{InMemoryRunStore, InMemoryTemplateStore};
pub use migrations::Migrator;
pub use repositories::{SeaOrmRunStore, SeaOrmTemplateStore};
