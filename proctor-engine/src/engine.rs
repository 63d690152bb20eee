use crate::registry::{RunHandle, RunRegistry};
use crate::task::LoadTask;
use chrono::Utc;
use proctor_core::{
    LiveSimulationState, ReportTemplate, Result, RunStatus, SafetyDiagnosis, SafetyGate, SimulationError,
    SimulationLimits, SimulationRun, StartSimulationRequest,
};
use proctor_interfaces::{ActorCredentials, RunStore, TemplateStore};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long shutdown waits for in-flight runs to finalize
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// Pacing of virtual actors and progress flushes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTiming {
    pub request_timeout: Duration,
    pub think_time_min: Duration,
    pub think_time_max: Duration,
    pub flush_interval: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            think_time_min: Duration::from_millis(250),
            think_time_max: Duration::from_millis(1000),
            flush_interval: Duration::from_secs(2),
        }
    }
}

/// Starts, stops and observes load simulation runs
pub struct SimulationEngine {
    gate: SafetyGate,
    runs: Arc<dyn RunStore>,
    templates: Arc<dyn TemplateStore>,
    credentials: Arc<dyn ActorCredentials>,
    limits: SimulationLimits,
    timing: EngineTiming,
    registry: Arc<RunRegistry>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SimulationEngine {
    pub fn new(
        gate: SafetyGate,
        runs: Arc<dyn RunStore>,
        templates: Arc<dyn TemplateStore>,
        credentials: Arc<dyn ActorCredentials>,
    ) -> Self {
        Self {
            gate,
            runs,
            templates,
            credentials,
            limits: SimulationLimits::default(),
            timing: EngineTiming::default(),
            registry: Arc::new(RunRegistry::new()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_limits(mut self, limits: SimulationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_timing(mut self, timing: EngineTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn diagnose(&self) -> SafetyDiagnosis {
        self.gate.diagnose()
    }

    /// Create a run and spawn its load task; returns without waiting for it.
    pub async fn start_run(&self, request: StartSimulationRequest, base_url: &str) -> Result<SimulationRun> {
        let diagnosis = self.gate.assert()?;

        // Check-then-act: two concurrent starts can both pass this check
        if let Some(running) = self.runs.find_running().await? {
            return Err(SimulationError::AlreadyRunning { run_id: running.id });
        }

        let config = self.limits.resolve(&request)?;

        let seeded = match &config.template {
            Some(definition) => {
                let template = self.templates.insert(ReportTemplate::from_definition(definition)).await?;
                info!(template_id = %template.id, name = %template.name, "Seeded simulation template");
                Some(template)
            }
            None => None,
        };

        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let live = LiveSimulationState::new(&run_id, started_at, Duration::from_secs(config.duration_sec));

        let run = SimulationRun {
            id: run_id.clone(),
            status: RunStatus::Running,
            scenario: config.scenario.as_str().to_string(),
            started_at,
            ended_at: None,
            requested_duration_sec: config.duration_sec,
            teachers: config.teachers,
            sub_admins: config.sub_admins,
            template_name: seeded.as_ref().map(|t| t.name.clone()),
            sandbox_template_id: seeded.as_ref().map(|t| t.id.clone()),
            sandbox: true,
            sandbox_marker: diagnosis.marker.clone(),
            summary: None,
            last_metrics: live.metrics(&diagnosis.db_identity, started_at),
            recent_actions: Vec::new(),
            error: None,
        };
        let run = self.runs.create(run).await?;

        let handle = RunHandle::new(live);
        self.registry.insert(&run_id, handle.clone());

        info!(
            run_id = %run_id,
            scenario = %config.scenario,
            teachers = config.teachers,
            sub_admins = config.sub_admins,
            duration_sec = config.duration_sec,
            db = %diagnosis.db_identity,
            "Simulation run started"
        );

        let task = LoadTask {
            run_id,
            config,
            base_url: base_url.to_string(),
            db_identity: diagnosis.db_identity,
            runs: Arc::clone(&self.runs),
            credentials: Arc::clone(&self.credentials),
            registry: Arc::clone(&self.registry),
            handle,
            timing: self.timing,
        };
        let join = tokio::spawn(task.execute());
        {
            let mut tasks = self.lock_tasks();
            tasks.retain(|task| !task.is_finished());
            tasks.push(join);
        }

        Ok(run)
    }

    /// Stop the run with `run_id`, or the most recent running run.
    pub async fn stop_run(&self, run_id: Option<&str>) -> Result<SimulationRun> {
        self.gate.assert()?;

        let run = match run_id {
            Some(id) => self
                .runs
                .find_by_id(id)
                .await?
                .ok_or_else(|| SimulationError::NotFound(format!("Simulation run {} not found", id)))?,
            None => self
                .runs
                .find_running()
                .await?
                .ok_or_else(|| SimulationError::NotFound("No simulation run is in progress".to_string()))?,
        };

        if !run.is_running() {
            return Ok(run);
        }

        if let Some(handle) = self.registry.get(&run.id) {
            info!(run_id = %run.id, "Stop requested for simulation run");
            handle.request_stop();
            return Ok(run);
        }

        // Running in the store but no task in this process: finalize directly
        warn!(run_id = %run.id, "Simulation run has no live task, marking stopped");
        let ended_at = Utc::now();
        let mut run = run;
        let elapsed_ms = (ended_at - run.started_at).num_milliseconds().max(0);
        run.status = RunStatus::Stopped;
        run.ended_at = Some(ended_at);
        run.summary = Some(json!({
            "attempted": run.last_metrics.get("attempted").cloned().unwrap_or(json!(0)),
            "succeeded": run.last_metrics.get("succeeded").cloned().unwrap_or(json!(0)),
            "failed": run.last_metrics.get("failed").cloned().unwrap_or(json!(0)),
            "actions": run.last_metrics.get("actions").cloned().unwrap_or(json!({})),
            "elapsedMs": elapsed_ms,
            "stoppedEarly": true,
            "orphaned": true,
        }));
        Ok(self.runs.update(run).await?)
    }

    /// Snapshot of a registered run's progress, `None` once finalized
    pub fn live_state(&self, run_id: &str) -> Option<LiveSimulationState> {
        self.registry.get(run_id).map(|handle| handle.snapshot())
    }

    pub async fn find_run(&self, run_id: &str) -> Result<SimulationRun> {
        let run = self
            .runs
            .find_by_id(run_id)
            .await?
            .ok_or_else(|| SimulationError::NotFound(format!("Simulation run {} not found", run_id)))?;
        Ok(self.with_live_overlay(run))
    }

    pub async fn list_runs(&self, limit: u64) -> Result<Vec<SimulationRun>> {
        let runs = self.runs.list_recent(limit).await?;
        Ok(runs.into_iter().map(|run| self.with_live_overlay(run)).collect())
    }

    /// The running run if any, otherwise the most recent one
    pub async fn current_run(&self) -> Result<Option<SimulationRun>> {
        let run = match self.runs.find_running().await? {
            Some(run) => Some(run),
            None => self.runs.list_recent(1).await?.into_iter().next(),
        };
        Ok(run.map(|run| self.with_live_overlay(run)))
    }

    /// Replace persisted progress with the fresher in-memory view
    pub fn with_live_overlay(&self, mut run: SimulationRun) -> SimulationRun {
        if !run.is_running() {
            return run;
        }
        if let Some(live) = self.live_state(&run.id) {
            run.last_metrics = live.metrics(self.gate.db_identity(), Utc::now());
            run.recent_actions = live.recent_actions();
        }
        run
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stop every in-flight run and wait up to `grace` for each to finalize
    pub async fn shutdown(&self, grace: Duration) {
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.lock_tasks());
        let pending = tasks.iter().filter(|task| !task.is_finished()).count();
        if pending == 0 {
            return;
        }

        info!(runs = pending, "Stopping in-flight simulation runs");
        self.registry.cancel_all();

        let drain = async {
            for task in tasks {
                if let Err(e) = task.await {
                    warn!(error = %e, "Load task ended abnormally during shutdown");
                }
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(
                grace_secs = grace.as_secs(),
                "Simulation runs did not finalize before shutdown, they stay running in the store"
            );
        }
    }
}
