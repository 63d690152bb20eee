//! Bearer token verification and the admin guard

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use proctor_config::AuthConfig;
use proctor_interfaces::{ActorCredentials, ActorRole, CredentialError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::WebError;

pub const ADMIN_ROLE: &str = "admin";

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: String,
    /// Token ID
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authentication context for the current request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub user_id: String,
    pub role: String,
    pub is_authenticated: bool,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            role: "guest".to_string(),
            is_authenticated: false,
        }
    }
}

impl AuthContext {
    pub fn authenticated(user_id: String, role: String) -> Self {
        Self {
            user_id,
            role,
            is_authenticated: true,
        }
    }

    pub fn can_admin(&self) -> bool {
        self.is_authenticated && self.role == ADMIN_ROLE
    }
}

/// Issues and verifies HS256 bearer tokens
pub struct JwtManager {
    issuer: String,
    audience: String,
    token_expiry_hours: i64,
    require_auth: bool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            token_expiry_hours: config.token_expiry_hours,
            require_auth: config.require_auth,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_ref()),
        }
    }

    pub fn require_auth(&self) -> bool {
        self.require_auth
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user_id: &str, role: &str) -> Result<String, WebError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_expiry_hours);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| WebError::internal(format!("Failed to generate JWT token: {}", e)))
    }

    /// Verify and decode a JWT token
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, WebError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT verification failed: {}", e);
            WebError::unauthorized("Invalid or expired token")
        })?;

        Ok(token_data.claims)
    }

    fn extract_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("Authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::trim)
    }

    /// Resolve the caller. Anonymous callers are accepted only when auth is not required.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, WebError> {
        match Self::extract_token(headers).map(|token| self.verify_token(token)) {
            Some(Ok(claims)) => {
                debug!(user = %claims.sub, role = %claims.role, "Bearer token accepted");
                Ok(AuthContext::authenticated(claims.sub, claims.role))
            }
            Some(Err(e)) if self.require_auth => Err(e),
            None if self.require_auth => Err(WebError::unauthorized("Authentication required")),
            _ => Ok(AuthContext::default()),
        }
    }
}

impl ActorCredentials for JwtManager {
    fn bearer_token(&self, role: ActorRole, index: u32, run_id: &str) -> Result<String, CredentialError> {
        let subject = format!("sim-{}-{}-{}", run_id, role, index);
        self.generate_token(&subject, role.as_str())
            .map_err(|e| CredentialError {
                role,
                index,
                message: e.to_string(),
            })
    }
}

/// Attach an `AuthContext` to the request, rejecting it when auth is required and missing
pub async fn auth_middleware(
    State(jwt): State<Arc<JwtManager>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let auth_context = jwt.authenticate(&headers)?;
    request.extensions_mut().insert(auth_context);
    Ok(next.run(request).await)
}

/// Reject callers without an admin credential: 401 when anonymous, 403 for other roles
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, WebError> {
    let auth_context = request.extensions().get::<AuthContext>().cloned().unwrap_or_default();

    if !auth_context.is_authenticated {
        return Err(WebError::unauthorized("Authentication required"));
    }
    if !auth_context.can_admin() {
        warn!(user = %auth_context.user_id, role = %auth_context.role, "Admin endpoint refused");
        return Err(WebError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}
