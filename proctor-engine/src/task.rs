use crate::actor::VirtualActor;
use crate::engine::EngineTiming;
use crate::registry::{RunHandle, RunRegistry};
use crate::scenario::action_plan;
use chrono::{DateTime, Utc};
use proctor_core::{RunStatus, SimulationRunConfig};
use proctor_interfaces::{ActorCredentials, ActorRole, RunStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

enum Outcome {
    Completed,
    Stopped,
    Failed(String),
}

/// The detached task behind one run
pub(crate) struct LoadTask {
    pub run_id: String,
    pub config: SimulationRunConfig,
    pub base_url: String,
    pub db_identity: String,
    pub runs: Arc<dyn RunStore>,
    pub credentials: Arc<dyn ActorCredentials>,
    pub registry: Arc<RunRegistry>,
    pub handle: RunHandle,
    pub timing: EngineTiming,
}

impl LoadTask {
    pub async fn execute(self) {
        let span = info_span!("simulation_run", run_id = %self.run_id);
        async move {
            let outcome = self.drive().await;
            self.finalize(outcome).await;
        }
        .instrument(span)
        .await
    }

    async fn drive(&self) -> Outcome {
        let deadline = Instant::now() + Duration::from_secs(self.config.duration_sec);
        let actor_cancel = self.handle.cancel.child_token();

        let actors = match self.build_actors(deadline, &actor_cancel) {
            Ok(actors) => actors,
            Err(message) => {
                error!(error = %message, "Simulation setup failed");
                return Outcome::Failed(message);
            }
        };

        info!(actors = actors.len(), duration_sec = self.config.duration_sec, "Virtual actors starting");
        let mut tasks = JoinSet::new();
        for actor in actors {
            tasks.spawn(actor.run());
        }

        let mut flush = tokio::time::interval_at(Instant::now() + self.timing.flush_interval, self.timing.flush_interval);
        let stopped = loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break false,
                _ = self.handle.cancel.cancelled() => break true,
                _ = flush.tick() => self.flush().await,
            }
        };

        actor_cancel.cancel();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Virtual actor task ended abnormally");
            }
        }

        if stopped {
            Outcome::Stopped
        } else {
            Outcome::Completed
        }
    }

    fn build_actors(&self, deadline: Instant, cancel: &CancellationToken) -> Result<Vec<VirtualActor>, String> {
        let client = reqwest::Client::builder()
            .timeout(self.timing.request_timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        let think_time = (self.timing.think_time_min, self.timing.think_time_max);
        let mut actors = Vec::with_capacity((self.config.teachers + self.config.sub_admins) as usize);

        for (role, count) in [
            (ActorRole::Teacher, self.config.teachers),
            (ActorRole::SubAdmin, self.config.sub_admins),
        ] {
            for index in 0..count {
                let token = self
                    .credentials
                    .bearer_token(role, index, &self.run_id)
                    .map_err(|e| e.to_string())?;
                actors.push(VirtualActor::new(
                    role,
                    index,
                    client.clone(),
                    base_url.clone(),
                    token,
                    action_plan(self.config.scenario, role),
                    self.handle.clone(),
                    cancel.clone(),
                    deadline,
                    think_time,
                ));
            }
        }

        Ok(actors)
    }

    async fn flush(&self) {
        let now = Utc::now();
        let (metrics, recent) = {
            let mut live = self.handle.live();
            live.last_flush_at = Some(now);
            (live.metrics(&self.db_identity, now), live.recent_actions())
        };

        match self.runs.find_by_id(&self.run_id).await {
            Ok(Some(mut run)) if run.is_running() => {
                run.last_metrics = metrics;
                run.recent_actions = recent;
                if let Err(e) = self.runs.update(run).await {
                    warn!(error = %e, "Failed to flush run progress");
                }
            }
            Ok(_) => debug!("Run is no longer running, skipping flush"),
            Err(e) => warn!(error = %e, "Failed to load run for flush"),
        }
    }

    async fn finalize(&self, outcome: Outcome) {
        let ended_at = Utc::now();
        if let Err(e) = self.persist_final(outcome, ended_at).await {
            error!(error = %e, "Failed to finalize simulation run");
        }
        self.registry.remove(&self.run_id);
    }

    async fn persist_final(&self, outcome: Outcome, ended_at: DateTime<Utc>) -> Result<(), StoreError> {
        let Some(mut run) = self.runs.find_by_id(&self.run_id).await? else {
            warn!("Run disappeared from the store before finalization");
            return Ok(());
        };
        if !run.is_running() {
            info!(status = %run.status, "Run already finalized, leaving it untouched");
            return Ok(());
        }

        let (status, stopped_early, error) = match outcome {
            Outcome::Completed => (RunStatus::Completed, false, None),
            Outcome::Stopped => (RunStatus::Stopped, true, None),
            Outcome::Failed(message) => (RunStatus::Failed, true, Some(message)),
        };

        let live = self.handle.snapshot();
        run.status = status;
        run.ended_at = Some(ended_at);
        run.summary = Some(live.summary(ended_at, stopped_early));
        run.last_metrics = live.metrics(&self.db_identity, ended_at);
        run.recent_actions = live.recent_actions();
        run.error = error;
        self.runs.update(run).await?;

        info!(
            status = %status,
            attempted = live.attempted,
            failed = live.failed,
            "Simulation run finalized"
        );
        Ok(())
    }
}
