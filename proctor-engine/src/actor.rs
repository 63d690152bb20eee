use crate::registry::RunHandle;
use crate::scenario::ActionKind;
use chrono::Utc;
use proctor_core::RecentAction;
use proctor_interfaces::ActorRole;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One simulated user hammering the application API
pub(crate) struct VirtualActor {
    pub role: ActorRole,
    pub index: u32,
    pub client: reqwest::Client,
    pub base_url: String,
    pub token: String,
    pub plan: &'static [ActionKind],
    pub handle: RunHandle,
    pub cancel: CancellationToken,
    pub deadline: Instant,
    pub think_time: (Duration, Duration),
    known_templates: Vec<String>,
}

impl VirtualActor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        role: ActorRole,
        index: u32,
        client: reqwest::Client,
        base_url: String,
        token: String,
        plan: &'static [ActionKind],
        handle: RunHandle,
        cancel: CancellationToken,
        deadline: Instant,
        think_time: (Duration, Duration),
    ) -> Self {
        Self {
            role,
            index,
            client,
            base_url,
            token,
            plan,
            handle,
            cancel,
            deadline,
            think_time,
            known_templates: Vec::new(),
        }
    }

    /// Perform actions until the deadline passes or the run is cancelled.
    /// An in-flight request is never interrupted.
    pub async fn run(mut self) {
        if self.plan.is_empty() {
            return;
        }
        let mut step = fastrand::usize(..self.plan.len());

        loop {
            if self.cancel.is_cancelled() || Instant::now() >= self.deadline {
                debug!(role = %self.role, index = self.index, "Stopping virtual actor");
                break;
            }

            let action = self.plan[step % self.plan.len()];
            step += 1;

            let record = self.perform(action).await;
            trace!(role = %self.role, index = self.index, action = %record.name, ok = record.ok, "Action finished");
            self.handle.live().record(record);

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.think()) => {}
            }
        }
    }

    fn think(&self) -> Duration {
        let (min, max) = self.think_time;
        let min_ms = min.as_millis() as u64;
        let max_ms = (max.as_millis() as u64).max(min_ms);
        Duration::from_millis(fastrand::u64(min_ms..=max_ms))
    }

    async fn perform(&mut self, action: ActionKind) -> RecentAction {
        // Nothing to open until a listing has been seen
        let action = if action == ActionKind::OpenTemplate && self.known_templates.is_empty() {
            ActionKind::ListTemplates
        } else {
            action
        };

        match action {
            ActionKind::ListTemplates => {
                let url = format!("{}/api/templates", self.base_url);
                let (record, body) = self.get(action.name(), &url).await;
                if let Some(Value::Array(templates)) = body {
                    self.known_templates = templates
                        .iter()
                        .filter_map(|t| t.get("id").and_then(Value::as_str).map(str::to_string))
                        .collect();
                }
                record
            }
            ActionKind::OpenTemplate => {
                let id = &self.known_templates[fastrand::usize(..self.known_templates.len())];
                let url = format!("{}/api/templates/{}", self.base_url, id);
                self.get(action.name(), &url).await.0
            }
            ActionKind::Health => {
                let url = format!("{}/health", self.base_url);
                self.get(action.name(), &url).await.0
            }
        }
    }

    async fn get(&self, name: &str, url: &str) -> (RecentAction, Option<Value>) {
        let started = std::time::Instant::now();
        let result = self.client.get(url).bearer_auth(&self.token).send().await;

        let (ok, http_status, error, body) = match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    let body = response.json::<Value>().await.ok();
                    (true, Some(status.as_u16()), None, body)
                } else {
                    (false, Some(status.as_u16()), Some(format!("HTTP {}", status)), None)
                }
            }
            Err(e) if e.is_timeout() => (false, None, Some("request timed out".to_string()), None),
            Err(e) => (false, None, Some(e.to_string()), None),
        };

        let record = RecentAction {
            name: name.to_string(),
            ok,
            elapsed_ms: started.elapsed().as_millis() as u64,
            http_status,
            error,
            at: Utc::now(),
        };
        (record, body)
    }
}
