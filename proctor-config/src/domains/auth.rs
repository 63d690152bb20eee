//! Bearer credential verification configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,

    pub issuer: String,

    pub audience: String,

    /// Lifetime of tokens minted for virtual actors
    pub token_expiry_hours: i64,

    /// When false, ordinary API endpoints accept anonymous requests.
    /// Admin endpoints always require an admin credential.
    #[serde(default = "crate::domains::utils::default_true")]
    pub require_auth: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            issuer: "proctor".to_string(),
            audience: "proctor-clients".to_string(),
            token_expiry_hours: 24,
            require_auth: true,
        }
    }
}

impl Validatable for AuthConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.jwt_secret, "jwt_secret", self.domain_name())?;
        validate_required_string(&self.issuer, "issuer", self.domain_name())?;
        validate_required_string(&self.audience, "audience", self.domain_name())?;
        validate_positive(self.token_expiry_hours, "token_expiry_hours", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}
