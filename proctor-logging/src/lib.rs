//! Logging setup for Proctor binaries and tests

pub mod init;

pub use init::{build_env_filter, init_logging};
