//! Read-only template endpoints exercised by virtual actors

use axum::{
    extract::{Path, State},
    Json,
};
use proctor_core::ReportTemplate;

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
};

pub async fn list_templates(State(ctx): State<AppContext>) -> RestResult<Json<Vec<ReportTemplate>>> {
    Ok(Json(ctx.templates.list().await?))
}

pub async fn get_template(State(ctx): State<AppContext>, Path(id): Path<String>) -> RestResult<Json<ReportTemplate>> {
    ctx.templates
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RestError::not_found(format!("Template {} not found", id)))
}
