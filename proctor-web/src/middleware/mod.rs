pub mod auth;
pub mod cors;
pub mod request_id;

pub use auth::{auth_middleware, require_admin_middleware, AuthContext, JwtClaims, JwtManager, ADMIN_ROLE};
pub use cors::cors_layer;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
