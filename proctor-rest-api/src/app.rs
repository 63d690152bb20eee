//! Router assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use proctor_web::{auth_middleware, cors_layer, request_id_middleware, require_admin_middleware};
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, handlers};

/// Mount point of the admin simulation control surface
pub const SIMULATIONS_PREFIX: &str = "/api/admin/simulations";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub enable_cors: bool,
    pub enable_request_id: bool,
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

/// Create the complete application router
pub fn create_app(context: AppContext, config: AppConfig) -> Router {
    let jwt = context.jwt.clone();

    let simulations = Router::new()
        .route("/sandbox/status", get(handlers::sandbox_status))
        .route("/sandbox/start", post(handlers::sandbox_start))
        .route("/sandbox/stop", post(handlers::sandbox_stop))
        .route("/status", get(handlers::simulation_status))
        .route("/history", get(handlers::run_history))
        .route("/start", post(handlers::start_run))
        .route("/stop", post(handlers::stop_run))
        .route("/{id}", get(handlers::get_run))
        // Admin check runs before either control strategy
        .route_layer(middleware::from_fn(require_admin_middleware))
        .route_layer(middleware::from_fn_with_state(jwt.clone(), auth_middleware));

    let templates = Router::new()
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/templates/{id}", get(handlers::get_template))
        .route_layer(middleware::from_fn_with_state(jwt, auth_middleware));

    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .nest(SIMULATIONS_PREFIX, simulations)
        .merge(templates)
        .with_state(context);

    // Applied in reverse order
    if config.enable_cors {
        app = app.layer(cors_layer());
    }
    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }
    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}
