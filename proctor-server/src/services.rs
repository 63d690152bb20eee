//! Service construction

use anyhow::{Context, Result};
use proctor_config::ProctorConfig;
use proctor_core::{SafetyDiagnosis, SafetyGate};
use proctor_engine::SimulationEngine;
use proctor_interfaces::{RunStore, SandboxSupervisor, TemplateStore};
use proctor_rest_api::{select_control, SimulationControl};
use proctor_sandbox::{SandboxManagerConfig, SandboxProcessManager, SANDBOX_DATABASE_URL};
use proctor_storage::{DatabaseConnection, SeaOrmRunStore, SeaOrmTemplateStore};
use proctor_web::JwtManager;
use std::sync::Arc;
use tracing::{info, warn};

/// Every long-lived service of the process
pub struct ServiceContainer {
    pub database: DatabaseConnection,
    pub runs: Arc<dyn RunStore>,
    pub templates: Arc<dyn TemplateStore>,
    pub jwt: Arc<JwtManager>,
    pub engine: Arc<SimulationEngine>,
    /// Only a primary process supervises a sandbox
    pub supervisor: Option<Arc<dyn SandboxSupervisor>>,
    pub control: Arc<dyn SimulationControl>,
    pub diagnosis: SafetyDiagnosis,
}

impl ServiceContainer {
    pub async fn new(config: &ProctorConfig) -> Result<Self> {
        let database = DatabaseConnection::new(
            &config.database.url,
            config.database.max_connections,
            config.database.connection_timeout,
        )
        .await
        .context("Failed to connect to database")?;
        database.migrate().await.context("Failed to run database migrations")?;

        let runs: Arc<dyn RunStore> = Arc::new(SeaOrmRunStore::new(database.clone()));
        let templates: Arc<dyn TemplateStore> = Arc::new(SeaOrmTemplateStore::new(database.clone()));
        let jwt = Arc::new(JwtManager::new(&config.auth));

        let gate = SafetyGate::new(config.simulation.enabled, &config.simulation.marker, &config.database.url);
        let diagnosis = gate.diagnose();
        if diagnosis.allowed {
            warn!(
                db = %diagnosis.db_identity,
                "Safety gate open: this process runs load simulations against its own database"
            );
        } else {
            info!(
                db = %diagnosis.db_identity,
                flag = diagnosis.flag,
                marker_match = diagnosis.marker_match,
                test_match = diagnosis.test_match,
                "Safety gate closed: simulation control is proxied to the sandbox server"
            );
        }

        let engine = Arc::new(SimulationEngine::new(gate, runs.clone(), templates.clone(), jwt.clone()));

        let supervisor: Option<Arc<dyn SandboxSupervisor>> = if diagnosis.allowed {
            None
        } else {
            let sandbox_diagnosis = sandbox_gate(&config.simulation.marker);
            if !sandbox_diagnosis.allowed {
                warn!(
                    marker = %config.simulation.marker,
                    db = %sandbox_diagnosis.db_identity,
                    "Simulation marker does not match the sandbox database, the sandbox server will refuse to run simulations"
                );
            }
            let manager = SandboxProcessManager::new(sandbox_manager_config(config))?;
            Some(Arc::new(manager))
        };

        let control = select_control(
            diagnosis.allowed,
            engine.clone(),
            supervisor.clone(),
            config.target_base_url(),
        )?;
        info!(mode = control.mode(), "Simulation control strategy selected");

        Ok(Self {
            database,
            runs,
            templates,
            jwt,
            engine,
            supervisor,
            control,
            diagnosis,
        })
    }
}

/// Build settings for the sandbox child. The child reads no config file, so
/// everything its token verification and logging depend on is passed as
/// `PROCTOR_*` variables.
pub fn sandbox_manager_config(config: &ProctorConfig) -> SandboxManagerConfig {
    SandboxManagerConfig::from_config(&config.sandbox, &config.simulation.marker)
        .with_env("PROCTOR_JWT_SECRET", &config.auth.jwt_secret)
        .with_env("PROCTOR_JWT_ISSUER", &config.auth.issuer)
        .with_env("PROCTOR_JWT_AUDIENCE", &config.auth.audience)
        .with_env("PROCTOR_REQUIRE_AUTH", config.auth.require_auth.to_string())
        .with_env("PROCTOR_LOG_LEVEL", config.logging.level.to_string())
}

/// The gate the sandbox child will evaluate against its fixed database
pub fn sandbox_gate(marker: &str) -> SafetyDiagnosis {
    SafetyGate::new(true, marker, SANDBOX_DATABASE_URL).diagnose()
}
