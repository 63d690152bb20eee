//! Health check endpoint

use axum::{extract::State, Json};

use crate::{context::AppContext, models::HealthResponse};

/// Liveness probe; the sandbox supervisor polls this before declaring a sandbox healthy
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sandbox: ctx.sandbox_mode,
    })
}
