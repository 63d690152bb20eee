use crate::build::run_build;
use crate::process::{describe_exit, kill_process_tree};
use crate::{SANDBOX_DATABASE_URL, SANDBOX_PORT, STDERR_LOG_FILE, STDOUT_LOG_FILE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proctor_config::SandboxConfig;
use proctor_core::{SandboxProcessStatus, SimulationError};
use proctor_interfaces::SandboxSupervisor;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// How the manager waits for a freshly spawned sandbox to come up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheckPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HealthCheckPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(750),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Build and spawn settings for the sandbox server
#[derive(Debug, Clone)]
pub struct SandboxManagerConfig {
    pub build_program: String,
    pub build_args: Vec<String>,
    pub working_dir: PathBuf,
    pub artifact_path: PathBuf,
    pub log_dir: PathBuf,
    /// Marker handed to the sandbox so its own safety gate opens
    pub marker: String,
    /// Extra variables passed through to the sandbox, applied before the fixed block
    pub extra_env: Vec<(String, String)>,
}

impl SandboxManagerConfig {
    pub fn from_config(config: &SandboxConfig, marker: impl Into<String>) -> Self {
        Self {
            build_program: config.build_program.clone(),
            build_args: config.build_args.clone(),
            working_dir: config.working_dir.clone(),
            artifact_path: config.resolved_artifact_path(),
            log_dir: config.resolved_log_dir(),
            marker: marker.into(),
            extra_env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    pub fn stdout_log(&self) -> PathBuf {
        self.log_dir.join(STDOUT_LOG_FILE)
    }

    pub fn stderr_log(&self) -> PathBuf {
        self.log_dir.join(STDERR_LOG_FILE)
    }
}

#[derive(Debug, Clone, Copy)]
struct ProcessHandle {
    pid: u32,
    started_at: DateTime<Utc>,
    generation: u64,
}

#[derive(Debug, Default)]
struct SandboxState {
    handle: Option<ProcessHandle>,
    last_error: Option<String>,
    generation: u64,
}

/// Owns the single sandbox server process of this host process
pub struct SandboxProcessManager {
    config: SandboxManagerConfig,
    port: u16,
    health: HealthCheckPolicy,
    state: Arc<Mutex<SandboxState>>,
    start_lock: tokio::sync::Mutex<()>,
    client: reqwest::Client,
}

impl SandboxProcessManager {
    pub fn new(config: SandboxManagerConfig) -> Result<Self, SimulationError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| SimulationError::Internal(format!("Failed to build health check client: {}", e)))?;

        Ok(Self {
            config,
            port: SANDBOX_PORT,
            health: HealthCheckPolicy::default(),
            state: Arc::new(Mutex::new(SandboxState::default())),
            start_lock: tokio::sync::Mutex::new(()),
            client,
        })
    }

    pub fn with_health_policy(mut self, policy: HealthCheckPolicy) -> Self {
        self.health = policy;
        self
    }

    #[cfg(test)]
    fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn lock_state(&self) -> MutexGuard<'_, SandboxState> {
        lock(&self.state)
    }

    fn snapshot(&self, state: &SandboxState) -> SandboxProcessStatus {
        SandboxProcessStatus {
            running: state.handle.is_some(),
            pid: state.handle.map(|h| h.pid),
            port: self.port,
            base_url: self.base_url(),
            started_at: state.handle.map(|h| h.started_at),
            last_error: state.last_error.clone(),
            stdout_log: Some(self.config.stdout_log()),
            stderr_log: Some(self.config.stderr_log()),
        }
    }

    fn record_error(&self, error: &SimulationError) {
        self.lock_state().last_error = Some(error.to_string());
    }

    async fn start_inner(&self) -> Result<SandboxProcessStatus, SimulationError> {
        run_build(
            self.config.build_program.clone(),
            self.config.build_args.clone(),
            self.config.working_dir.clone(),
        )
        .await?;

        let artifact = self.verify_artifact()?;
        let handle = self.spawn(&artifact)?;

        info!(pid = handle.pid, port = self.port, "Sandbox server spawned, waiting for health");
        self.wait_for_health(handle.generation).await?;

        info!(pid = handle.pid, base_url = %self.base_url(), "Sandbox server is healthy");
        Ok(self.status())
    }

    fn verify_artifact(&self) -> Result<PathBuf, SimulationError> {
        let path = &self.config.artifact_path;
        if !path.is_file() {
            return Err(SimulationError::MissingBuild {
                path: path.display().to_string(),
            });
        }
        std::fs::canonicalize(path).map_err(|_| SimulationError::MissingBuild {
            path: path.display().to_string(),
        })
    }

    fn spawn(&self, artifact: &Path) -> Result<ProcessHandle, SimulationError> {
        std::fs::create_dir_all(&self.config.log_dir).map_err(|e| {
            SimulationError::Internal(format!(
                "Failed to create sandbox log directory {}: {}",
                self.config.log_dir.display(),
                e
            ))
        })?;
        let stdout = open_log(&self.config.stdout_log())?;
        let stderr = open_log(&self.config.stderr_log())?;

        let mut command = tokio::process::Command::new(artifact);
        command
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(false);
        for (key, value) in &self.config.extra_env {
            command.env(key, value);
        }
        command
            .env("PROCTOR_PORT", self.port.to_string())
            .env("PROCTOR_DATABASE_URL", SANDBOX_DATABASE_URL)
            .env("PROCTOR_SIMULATION_ENABLED", "true")
            .env("PROCTOR_SIMULATION_MARKER", &self.config.marker)
            .env("PROCTOR_TARGET_PORT", self.port.to_string());

        // Own process group so stop() can take down everything it forks
        #[cfg(unix)]
        command.process_group(0);
        #[cfg(windows)]
        command.creation_flags(0x0000_0200);

        let mut child = command.spawn().map_err(|e| {
            SimulationError::Internal(format!("Failed to spawn sandbox server {}: {}", artifact.display(), e))
        })?;
        let pid = child
            .id()
            .ok_or_else(|| SimulationError::Internal("Sandbox server exited before reporting a pid".to_string()))?;

        let handle = {
            let mut state = self.lock_state();
            state.generation += 1;
            let handle = ProcessHandle {
                pid,
                started_at: Utc::now(),
                generation: state.generation,
            };
            state.handle = Some(handle);
            handle
        };

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = child.wait().await;
            let mut state = lock(&state);
            if state.handle.map(|h| h.generation) != Some(handle.generation) {
                debug!(pid, "Sandbox exit observed for a superseded handle");
                return;
            }
            match outcome {
                Ok(status) => {
                    if let Some(reason) = describe_exit(&status) {
                        warn!(pid, reason = %reason, "Sandbox server exited");
                        state.last_error = Some(reason);
                    } else {
                        info!(pid, "Sandbox server exited cleanly");
                    }
                }
                Err(e) => {
                    error!(pid, error = %e, "Failed to wait on sandbox server");
                    state.last_error = Some(format!("Failed to wait on sandbox server: {}", e));
                }
            }
            state.handle = None;
        });

        Ok(handle)
    }

    /// Poll `/health` until it answers, failing early once the spawned
    /// process is gone so a stale listener on the port cannot stand in for it.
    async fn wait_for_health(&self, generation: u64) -> Result<(), SimulationError> {
        let url = format!("{}/health", self.base_url());
        let deadline = Instant::now() + self.health.timeout;

        loop {
            self.ensure_alive(generation)?;
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return self.ensure_alive(generation),
                Ok(response) => debug!(status = %response.status(), "Sandbox health check not ready"),
                Err(e) => debug!(error = %e, "Sandbox health check failed"),
            }

            if Instant::now() >= deadline {
                return Err(SimulationError::HealthCheckTimeout {
                    base_url: self.base_url(),
                    timeout_secs: self.health.timeout.as_secs_f64().ceil() as u64,
                });
            }
            tokio::time::sleep(self.health.interval).await;
        }
    }

    fn ensure_alive(&self, generation: u64) -> Result<(), SimulationError> {
        let state = self.lock_state();
        if state.handle.map(|h| h.generation) == Some(generation) {
            return Ok(());
        }
        let reason = state
            .last_error
            .clone()
            .unwrap_or_else(|| "Sandbox server exited".to_string());
        Err(SimulationError::Internal(format!(
            "Sandbox server exited before becoming healthy: {}",
            reason
        )))
    }
}

#[async_trait]
impl SandboxSupervisor for SandboxProcessManager {
    async fn start(&self) -> Result<SandboxProcessStatus, SimulationError> {
        let _guard = self.start_lock.lock().await;

        {
            let mut state = self.lock_state();
            if state.handle.is_some() {
                debug!("Sandbox server already running");
                return Ok(self.snapshot(&state));
            }
            state.last_error = None;
        }

        match self.start_inner().await {
            Ok(status) => Ok(status),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Failed to start sandbox server");
                self.record_error(&e);
                Err(e)
            }
        }
    }

    async fn stop(&self) -> Result<SandboxProcessStatus, SimulationError> {
        let handle = self.lock_state().handle;
        let Some(handle) = handle else {
            return Ok(self.status());
        };

        info!(pid = handle.pid, "Stopping sandbox server");
        kill_process_tree(handle.pid);

        let mut state = self.lock_state();
        state.handle = None;
        Ok(self.snapshot(&state))
    }

    fn status(&self) -> SandboxProcessStatus {
        let state = self.lock_state();
        self.snapshot(&state)
    }
}

fn lock(state: &Mutex<SandboxState>) -> MutexGuard<'_, SandboxState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn open_log(path: &Path) -> Result<File, SimulationError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SimulationError::Internal(format!("Failed to open sandbox log {}: {}", path.display(), e)))
}
