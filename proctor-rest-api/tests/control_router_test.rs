//! Control router behaviour in both process modes

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header::AUTHORIZATION, HeaderMap, Method, Request, StatusCode, Uri},
    Json, Router,
};
use chrono::Utc;
use proctor_config::AuthConfig;
use proctor_core::{ReportTemplate, SafetyGate, SandboxProcessStatus, SimulationLimits};
use proctor_engine::SimulationEngine;
use proctor_interfaces::{SandboxSupervisor, TemplateStore};
use proctor_rest_api::{create_app, select_control, AppConfig, AppContext, LocalControl, SimulationControl};
use proctor_storage::{InMemoryRunStore, InMemoryTemplateStore};
use proctor_web::JwtManager;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower::ServiceExt;

const SANDBOX_URL: &str = "sqlite://data/proctor_sandbox.db?mode=rwc";
const PRIMARY_URL: &str = "sqlite://data/proctor.db?mode=rwc";

struct FakeSupervisor {
    status: Mutex<SandboxProcessStatus>,
    starts: AtomicUsize,
}

impl FakeSupervisor {
    fn idle() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SandboxProcessStatus::idle(3101)),
            starts: AtomicUsize::new(0),
        })
    }

    fn running_at(base_url: &str) -> Arc<Self> {
        let supervisor = Self::idle();
        {
            let mut status = supervisor.status.lock().unwrap();
            status.running = true;
            status.pid = Some(4242);
            status.base_url = base_url.to_string();
            status.started_at = Some(Utc::now());
        }
        supervisor
    }
}

#[async_trait]
impl SandboxSupervisor for FakeSupervisor {
    async fn start(&self) -> proctor_core::Result<SandboxProcessStatus> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let mut status = self.status.lock().unwrap();
        status.running = true;
        status.pid = Some(4242);
        status.started_at = Some(Utc::now());
        Ok(status.clone())
    }

    async fn stop(&self) -> proctor_core::Result<SandboxProcessStatus> {
        let mut status = self.status.lock().unwrap();
        *status = SandboxProcessStatus::idle(status.port);
        Ok(status.clone())
    }

    fn status(&self) -> SandboxProcessStatus {
        self.status.lock().unwrap().clone()
    }
}

fn jwt() -> Arc<JwtManager> {
    Arc::new(JwtManager::new(&AuthConfig {
        jwt_secret: "router-test-secret".to_string(),
        ..Default::default()
    }))
}

fn engine(database_url: &str, jwt: Arc<JwtManager>, templates: Arc<InMemoryTemplateStore>) -> Arc<SimulationEngine> {
    let enabled = database_url == SANDBOX_URL;
    Arc::new(
        SimulationEngine::new(
            SafetyGate::new(enabled, "sandbox", database_url),
            Arc::new(InMemoryRunStore::new()),
            templates,
            jwt,
        )
        .with_limits(SimulationLimits {
            min_duration_sec: 1,
            ..Default::default()
        }),
    )
}

struct TestApp {
    router: Router,
    jwt: Arc<JwtManager>,
    templates: Arc<InMemoryTemplateStore>,
}

impl TestApp {
    fn primary(supervisor: Arc<FakeSupervisor>) -> Self {
        let jwt = jwt();
        let templates = Arc::new(InMemoryTemplateStore::new());
        let engine = engine(PRIMARY_URL, jwt.clone(), templates.clone());
        let supervisor: Arc<dyn SandboxSupervisor> = supervisor;
        let control = select_control(
            engine.diagnose().allowed,
            engine,
            Some(supervisor.clone()),
            "http://127.0.0.1:3100".to_string(),
        )
        .unwrap();
        assert_eq!(control.mode(), "proxy");

        let context = AppContext::new(control, Some(supervisor), templates.clone(), jwt.clone(), false);
        Self {
            router: create_app(context, AppConfig::default()),
            jwt,
            templates,
        }
    }

    fn sandbox() -> Self {
        let jwt = jwt();
        let templates = Arc::new(InMemoryTemplateStore::new());
        let engine = engine(SANDBOX_URL, jwt.clone(), templates.clone());
        let control = select_control(engine.diagnose().allowed, engine, None, "http://127.0.0.1:9".to_string()).unwrap();
        assert_eq!(control.mode(), "local");

        let context = AppContext::new(control, None, templates.clone(), jwt.clone(), true);
        Self {
            router: create_app(context, AppConfig::default()),
            jwt,
            templates,
        }
    }

    fn token(&self, role: &str) -> String {
        self.jwt.generate_token("tester", role).unwrap()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }

    async fn admin(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let token = self.token("admin");
        let (status, _, json) = self.send(method, uri, Some(&token), body).await;
        (status, json)
    }
}

/// Stand-in sandbox server that echoes what it received
async fn downstream() -> String {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
        let status = match uri.path() {
            p if p.ends_with("/start") => StatusCode::ACCEPTED,
            p if p.ends_with("/status") => StatusCode::CONFLICT,
            _ => StatusCode::OK,
        };
        (
            status,
            Json(json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query(),
                "authorization": headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
                "requestId": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
                "body": serde_json::from_slice::<Value>(&body).ok(),
            })),
        )
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().fallback(echo)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health_reports_process_mode() {
    let primary = TestApp::primary(FakeSupervisor::idle());
    let (status, headers, body) = primary.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "sandbox": false}));
    assert!(headers.contains_key("x-request-id"));

    let sandbox = TestApp::sandbox();
    let (_, _, body) = sandbox.send(Method::GET, "/health", None, None).await;
    assert_eq!(body["sandbox"], true);
}

#[tokio::test]
async fn test_control_endpoints_require_admin() {
    let app = TestApp::primary(FakeSupervisor::idle());
    let teacher = app.token("teacher");

    for uri in ["/api/admin/simulations/status", "/api/admin/simulations/sandbox/status"] {
        let (status, _, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");
        assert_eq!(body["error"]["status"], 401);

        let (status, _, body) = app.send(Method::GET, uri, Some(&teacher), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "forbidden");
    }
}

#[tokio::test]
async fn test_proxy_fails_fast_without_sandbox() {
    let app = TestApp::primary(FakeSupervisor::idle());
    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/start", Some("{}")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "sandbox_server_not_running");
    assert_eq!(body["error"]["status"], 503);
}

#[tokio::test]
async fn test_proxy_forwards_calls_verbatim() {
    let base_url = downstream().await;
    let app = TestApp::primary(FakeSupervisor::running_at(&base_url));
    let token = app.token("admin");

    let (status, headers, body) = app
        .send(
            Method::POST,
            "/api/admin/simulations/start",
            Some(&token),
            Some(r#"{"teachers": 3, "scenario": "browse"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    // The sandbox logs the call under the same request id as the primary
    let request_id = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(body["requestId"], request_id);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/api/admin/simulations/start");
    assert_eq!(body["authorization"], format!("Bearer {}", token));
    assert_eq!(body["body"], json!({"teachers": 3, "scenario": "browse"}));

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/history?limit=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "/api/admin/simulations/history");
    assert_eq!(body["query"], "limit=7");

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/run-42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "/api/admin/simulations/run-42");

    // Downstream status codes pass through untouched
    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/status", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["path"], "/api/admin/simulations/status");
}

#[tokio::test]
async fn test_proxy_connection_failure_embeds_sandbox_status() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base_url = format!("http://{}", addr);
    let app = TestApp::primary(FakeSupervisor::running_at(&base_url));
    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/status", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "sandbox_proxy_failed");
    assert_eq!(body["error"]["details"]["sandbox"]["running"], true);
    assert_eq!(body["error"]["details"]["sandbox"]["baseUrl"], base_url);
}

#[tokio::test]
async fn test_lifecycle_endpoints_run_locally() {
    let supervisor = FakeSupervisor::idle();
    let app = TestApp::primary(supervisor.clone());

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/sandbox/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sandbox"]["running"], false);

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/sandbox/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sandbox"]["running"], true);
    assert_eq!(body["sandbox"]["pid"], 4242);
    assert_eq!(supervisor.starts.load(Ordering::SeqCst), 1);

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/sandbox/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sandbox"]["running"], false);
    assert!(body["sandbox"]["pid"].is_null());
}

#[tokio::test]
async fn test_lifecycle_rejected_inside_sandbox() {
    let app = TestApp::sandbox();
    for (method, uri) in [
        (Method::GET, "/api/admin/simulations/sandbox/status"),
        (Method::POST, "/api/admin/simulations/sandbox/start"),
        (Method::POST, "/api/admin/simulations/sandbox/stop"),
    ] {
        let (status, body) = app.admin(method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_operation");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_run_lifecycle() {
    let app = TestApp::sandbox();

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/simulations/start",
            Some(r#"{"teachers": 0, "subAdmins": 0, "durationSec": 30}"#),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let run_id = body["runId"].as_str().unwrap().to_string();
    assert_eq!(body["run"]["status"], "running");
    assert_eq!(body["run"]["sandbox"], true);

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["run"]["id"], run_id);
    assert_eq!(body["safety"]["allowed"], true);
    assert!(!body["live"].is_null());

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/start", Some("{}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_running");
    assert_eq!(body["error"]["details"]["runId"], run_id);

    let (_, body) = app.admin(Method::GET, "/api/admin/simulations/history?limit=5", None).await;
    assert_eq!(body["runs"].as_array().unwrap().len(), 1);

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/stop", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["run"]["id"], run_id);

    let uri = format!("/api/admin/simulations/{}", run_id);
    let started = Instant::now();
    loop {
        let (status, body) = app.admin(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        if body["run"]["status"] == "stopped" {
            assert_eq!(body["run"]["summary"]["stoppedEarly"], true);
            assert!(body["live"].is_null());
            break;
        }
        assert!(started.elapsed() < Duration::from_secs(5), "run never stopped");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_local_request_validation() {
    let app = TestApp::sandbox();

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/start", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (status, body) = app
        .admin(Method::POST, "/api/admin/simulations/start", Some(r#"{"scenario": "stampede"}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/history?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/missing-run", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/stop", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_local_control_still_checks_the_gate() {
    let jwt = jwt();
    let templates = Arc::new(InMemoryTemplateStore::new());
    let engine = engine(PRIMARY_URL, jwt.clone(), templates.clone());
    let control = Arc::new(LocalControl::new(engine, "http://127.0.0.1:9".to_string()));
    let router = create_app(
        AppContext::new(control, None, templates, jwt.clone(), true),
        AppConfig::default(),
    );
    let app = TestApp { router, jwt, templates: Arc::new(InMemoryTemplateStore::new()) };

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/start", Some("{}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "simulation_not_allowed");
    assert_eq!(body["error"]["details"]["dbIdentity"], "proctor");

    let (status, body) = app.admin(Method::POST, "/api/admin/simulations/stop", Some("{}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "simulation_not_allowed");

    // Read-only calls do not consult the gate
    let (status, body) = app.admin(Method::GET, "/api/admin/simulations/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["safety"]["allowed"], false);
}

#[tokio::test]
async fn test_template_endpoints() {
    let app = TestApp::sandbox();
    let template = app
        .templates
        .insert(ReportTemplate {
            id: "tpl-1".to_string(),
            name: "Term report".to_string(),
            definition: json!({"columns": 3}),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let teacher = app.token("teacher");
    let (status, _, body) = app.send(Method::GET, "/api/templates", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], template.id);

    let (status, _, body) = app.send(Method::GET, "/api/templates/tpl-1", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Term report");
    assert_eq!(body["definition"]["columns"], 3);

    let (status, _, body) = app.send(Method::GET, "/api/templates/nope", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _, _) = app.send(Method::GET, "/api/templates", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
