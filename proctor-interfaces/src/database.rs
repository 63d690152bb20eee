//! Repository interfaces for simulation runs and report templates

use async_trait::async_trait;
use proctor_core::{ReportTemplate, SimulationError, SimulationRun};

/// Common storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal database error: {message}")]
    Internal { message: String },
}

impl From<StoreError> for SimulationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => {
                SimulationError::NotFound(format!("{} {}", entity, id))
            }
            other => SimulationError::Storage(other.to_string()),
        }
    }
}

/// Persistence for simulation runs. Only the run engine writes.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn create(&self, run: SimulationRun) -> Result<SimulationRun, StoreError>;

    /// Most recently started run whose status is `running`
    async fn find_running(&self) -> Result<Option<SimulationRun>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<SimulationRun>, StoreError>;

    /// At most `limit` runs, newest `started_at` first
    async fn list_recent(&self, limit: u64) -> Result<Vec<SimulationRun>, StoreError>;

    /// Replace the stored record with the same id
    async fn update(&self, run: SimulationRun) -> Result<SimulationRun, StoreError>;
}

/// Persistence for report templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert(&self, template: ReportTemplate) -> Result<ReportTemplate, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ReportTemplate>, StoreError>;

    /// All templates, newest first
    async fn list(&self) -> Result<Vec<ReportTemplate>, StoreError>;
}
