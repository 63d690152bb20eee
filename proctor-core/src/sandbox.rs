//! Sandbox process status snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Point-in-time view of the supervised sandbox server. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxProcessStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub port: u16,
    pub base_url: String,
    pub started_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub stdout_log: Option<PathBuf>,
    pub stderr_log: Option<PathBuf>,
}

impl SandboxProcessStatus {
    /// Status of a supervisor with no live process on `port`
    pub fn idle(port: u16) -> Self {
        Self {
            running: false,
            pid: None,
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            started_at: None,
            last_error: None,
            stdout_log: None,
            stderr_log: None,
        }
    }
}
