//! Credentials for virtual actors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a virtual actor plays against the application API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Teacher,
    SubAdmin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Teacher => "teacher",
            ActorRole::SubAdmin => "sub_admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to issue credentials for {role} actor {index}: {message}")]
pub struct CredentialError {
    pub role: ActorRole,
    pub index: u32,
    pub message: String,
}

/// Issues bearer tokens the run engine attaches to actor requests
pub trait ActorCredentials: Send + Sync {
    fn bearer_token(&self, role: ActorRole, index: u32, run_id: &str) -> Result<String, CredentialError>;
}
