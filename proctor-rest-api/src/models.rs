//! Query and response bodies of the control surface

use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_LIMIT: u64 = 20;
pub const MAX_HISTORY_LIMIT: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

impl HistoryQuery {
    /// Requested limit bounded to `1..=MAX_HISTORY_LIMIT`
    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            None => DEFAULT_HISTORY_LIMIT,
            Some(limit) if limit < 1 => 1,
            Some(limit) => (limit as u64).min(MAX_HISTORY_LIMIT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sandbox: bool,
}
