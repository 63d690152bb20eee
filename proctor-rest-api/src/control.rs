//! Simulation control strategies
//!
//! A primary process never runs simulations itself; it forwards control calls
//! to the sandbox server it supervises. The sandbox server answers them from
//! its own run engine. Which of the two a process uses is decided once, from
//! the safety gate's diagnosis, when the router is built.

use async_trait::async_trait;
use axum::{
    http::{header::AUTHORIZATION, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use proctor_core::{SimulationError, StartSimulationRequest, StopSimulationRequest};
use proctor_engine::SimulationEngine;
use proctor_interfaces::SandboxSupervisor;
use proctor_web::{RequestId, REQUEST_ID_HEADER};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::SIMULATIONS_PREFIX;
use crate::errors::RestResult;

pub const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

/// Which control operation a request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOp {
    Status,
    History { limit: u64 },
    Get { id: String },
    Start,
    Stop,
}

/// A control call as received, with everything needed to forward it unchanged
#[derive(Debug, Clone)]
pub struct ControlRequest {
    pub op: ControlOp,
    pub method: Method,
    /// Path below the simulations prefix, e.g. `/history`
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
    pub authorization: Option<HeaderValue>,
    /// Forwarded so both processes log the call under one id
    pub request_id: RequestId,
}

/// Status and JSON body returned to the caller as-is
#[derive(Debug, Clone, PartialEq)]
pub struct ControlReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ControlReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl IntoResponse for ControlReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[async_trait]
pub trait SimulationControl: Send + Sync {
    /// Short name for logs: `proxy` or `local`
    fn mode(&self) -> &'static str;

    async fn handle(&self, request: ControlRequest) -> RestResult<ControlReply>;
}

/// Pick the strategy for this process. Only a verified sandbox answers locally.
pub fn select_control(
    allowed: bool,
    engine: Arc<SimulationEngine>,
    supervisor: Option<Arc<dyn SandboxSupervisor>>,
    target_base_url: String,
) -> Result<Arc<dyn SimulationControl>, SimulationError> {
    if allowed {
        return Ok(Arc::new(LocalControl::new(engine, target_base_url)));
    }
    let supervisor = supervisor.ok_or_else(|| {
        SimulationError::Internal("A primary process needs a sandbox supervisor to proxy simulations".to_string())
    })?;
    Ok(Arc::new(ProxyControl::new(supervisor)?))
}

/// Forwards control calls to the supervised sandbox server
pub struct ProxyControl {
    supervisor: Arc<dyn SandboxSupervisor>,
    client: reqwest::Client,
}

impl ProxyControl {
    pub fn new(supervisor: Arc<dyn SandboxSupervisor>) -> Result<Self, SimulationError> {
        // The sandbox runs on the same host, possibly with a self-signed certificate
        let client = reqwest::Client::builder()
            .timeout(PROXY_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| SimulationError::Internal(format!("Failed to build proxy client: {}", e)))?;
        Ok(Self { supervisor, client })
    }

    fn proxy_failed(&self, error: impl std::fmt::Display) -> SimulationError {
        SimulationError::SandboxProxyFailed {
            message: error.to_string(),
            sandbox: Box::new(self.supervisor.status()),
        }
    }
}

#[async_trait]
impl SimulationControl for ProxyControl {
    fn mode(&self) -> &'static str {
        "proxy"
    }

    async fn handle(&self, request: ControlRequest) -> RestResult<ControlReply> {
        let sandbox = self.supervisor.status();
        if !sandbox.running {
            return Err(SimulationError::SandboxNotRunning.into());
        }

        let mut url = format!(
            "{}{}{}",
            sandbox.base_url.trim_end_matches('/'),
            SIMULATIONS_PREFIX,
            request.path
        );
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        debug!(method = %request.method, url = %url, "Forwarding simulation control call");

        let mut outbound = self
            .client
            .request(request.method.clone(), &url)
            .header(REQUEST_ID_HEADER, request.request_id.as_str());
        if let Some(authorization) = request.authorization {
            outbound = outbound.header(AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            outbound = outbound.json(body);
        }

        let response = outbound.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Sandbox proxy call failed");
            self.proxy_failed(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.proxy_failed(e))?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(ControlReply { status, body })
    }
}

/// Answers control calls from this process's own run engine
pub struct LocalControl {
    engine: Arc<SimulationEngine>,
    target_base_url: String,
}

impl LocalControl {
    pub fn new(engine: Arc<SimulationEngine>, target_base_url: String) -> Self {
        Self {
            engine,
            target_base_url,
        }
    }
}

fn parse_body<T: DeserializeOwned + Default>(body: Option<Value>) -> Result<T, SimulationError> {
    match body {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| SimulationError::InvalidRequest(format!("Malformed request body: {}", e))),
    }
}

#[async_trait]
impl SimulationControl for LocalControl {
    fn mode(&self) -> &'static str {
        "local"
    }

    async fn handle(&self, request: ControlRequest) -> RestResult<ControlReply> {
        match request.op {
            ControlOp::Status => {
                let run = self.engine.current_run().await?;
                let live = run.as_ref().and_then(|run| self.engine.live_state(&run.id));
                Ok(ControlReply::ok(json!({
                    "safety": self.engine.diagnose(),
                    "run": run,
                    "live": live,
                })))
            }
            ControlOp::History { limit } => {
                let runs = self.engine.list_runs(limit).await?;
                Ok(ControlReply::ok(json!({ "runs": runs })))
            }
            ControlOp::Get { id } => {
                let run = self.engine.find_run(&id).await?;
                let live = self.engine.live_state(&run.id);
                Ok(ControlReply::ok(json!({ "run": run, "live": live })))
            }
            ControlOp::Start => {
                let start: StartSimulationRequest = parse_body(request.body)?;
                let run = self.engine.start_run(start, &self.target_base_url).await?;
                info!(run_id = %run.id, "Simulation run accepted");
                Ok(ControlReply {
                    status: StatusCode::ACCEPTED,
                    body: json!({ "runId": run.id, "run": run }),
                })
            }
            ControlOp::Stop => {
                let stop: StopSimulationRequest = parse_body(request.body)?;
                let run = self.engine.stop_run(stop.run_id.as_deref()).await?;
                Ok(ControlReply::ok(json!({ "run": run })))
            }
        }
    }
}
