//! Dual-mode simulation control endpoints

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
};
use serde_json::Value;

use crate::{
    context::AppContext,
    control::{ControlOp, ControlReply, ControlRequest},
    errors::{RestError, RestResult},
    models::HistoryQuery,
};
use proctor_web::RequestId;

fn control_request(
    op: ControlOp,
    method: Method,
    path: String,
    query: Option<String>,
    headers: &HeaderMap,
    request_id: RequestId,
    body: Option<Value>,
) -> ControlRequest {
    ControlRequest {
        op,
        method,
        path,
        query,
        body,
        authorization: headers.get(AUTHORIZATION).cloned(),
        request_id,
    }
}

fn json_body(bytes: &Bytes) -> RestResult<Option<Value>> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| RestError::invalid_request(format!("Request body is not valid JSON: {}", e)))
}

async fn dispatch(ctx: &AppContext, request: ControlRequest) -> RestResult<ControlReply> {
    tracing::debug!(mode = ctx.control.mode(), op = ?request.op, "Simulation control call");
    ctx.control.handle(request).await
}

pub async fn simulation_status(
    State(ctx): State<AppContext>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    request_id: RequestId,
) -> RestResult<ControlReply> {
    let request = control_request(ControlOp::Status, Method::GET, "/status".into(), query, &headers, request_id, None);
    dispatch(&ctx, request).await
}

pub async fn run_history(
    State(ctx): State<AppContext>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    request_id: RequestId,
) -> RestResult<ControlReply> {
    let Query(params) = params.map_err(|e| RestError::invalid_request(e.body_text()))?;
    let op = ControlOp::History {
        limit: params.effective_limit(),
    };
    let request = control_request(op, Method::GET, "/history".into(), query, &headers, request_id, None);
    dispatch(&ctx, request).await
}

pub async fn get_run(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    request_id: RequestId,
) -> RestResult<ControlReply> {
    let path = format!("/{}", id);
    let request = control_request(ControlOp::Get { id }, Method::GET, path, query, &headers, request_id, None);
    dispatch(&ctx, request).await
}

pub async fn start_run(
    State(ctx): State<AppContext>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    request_id: RequestId,
    body: Bytes,
) -> RestResult<ControlReply> {
    let body = json_body(&body)?;
    let request = control_request(ControlOp::Start, Method::POST, "/start".into(), query, &headers, request_id, body);
    dispatch(&ctx, request).await
}

pub async fn stop_run(
    State(ctx): State<AppContext>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    request_id: RequestId,
    body: Bytes,
) -> RestResult<ControlReply> {
    let body = json_body(&body)?;
    let request = control_request(ControlOp::Stop, Method::POST, "/stop".into(), query, &headers, request_id, body);
    dispatch(&ctx, request).await
}
