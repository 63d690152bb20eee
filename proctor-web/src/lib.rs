//! # Proctor Web Utilities
//!
//! Middleware shared by the Proctor HTTP surfaces: a JSON error type, bearer
//! token verification with an admin guard, request ids and CORS.
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use proctor_config::AuthConfig;
//! use proctor_web::{auth_middleware, require_admin_middleware, request_id_middleware, JwtManager};
//! use std::sync::Arc;
//!
//! async fn secret() -> &'static str {
//!     "admins only"
//! }
//!
//! let jwt = Arc::new(JwtManager::new(&AuthConfig::default()));
//! let app: Router = Router::new()
//!     .route("/secret", get(secret))
//!     .layer(middleware::from_fn(require_admin_middleware))
//!     .layer(middleware::from_fn_with_state(jwt, auth_middleware))
//!     .layer(middleware::from_fn(request_id_middleware));
//! ```

pub mod errors;
pub mod middleware;

pub use errors::{WebError, WebResult};
pub use middleware::{
    auth_middleware, cors_layer, request_id_middleware, require_admin_middleware, AuthContext, JwtClaims,
    JwtManager, RequestId, ADMIN_ROLE, REQUEST_ID_HEADER,
};
