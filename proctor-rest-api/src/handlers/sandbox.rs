//! Sandbox lifecycle endpoints. Always local, never forwarded.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{context::AppContext, errors::RestResult};

pub async fn sandbox_status(State(ctx): State<AppContext>) -> RestResult<Json<Value>> {
    let supervisor = ctx.local_supervisor()?;
    Ok(Json(json!({ "sandbox": supervisor.status() })))
}

pub async fn sandbox_start(State(ctx): State<AppContext>) -> RestResult<Json<Value>> {
    let supervisor = ctx.local_supervisor()?;
    info!("Sandbox start requested");
    let status = supervisor.start().await?;
    Ok(Json(json!({ "sandbox": status })))
}

pub async fn sandbox_stop(State(ctx): State<AppContext>) -> RestResult<Json<Value>> {
    let supervisor = ctx.local_supervisor()?;
    info!("Sandbox stop requested");
    let status = supervisor.stop().await?;
    Ok(Json(json!({ "sandbox": status })))
}
