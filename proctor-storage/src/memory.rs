//! In-memory store implementations

use async_trait::async_trait;
use proctor_core::{ReportTemplate, SimulationRun};
use proctor_interfaces::{RunStore, StoreError, TemplateStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Run store backed by a map; history is lost when the process exits
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<String, SimulationRun>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored runs, for assertions in tests
    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn create(&self, run: SimulationRun) -> Result<SimulationRun, StoreError> {
        self.runs.write().await.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    async fn find_running(&self) -> Result<Option<SimulationRun>, StoreError> {
        let runs = self.runs.read().await;
        Ok(runs
            .values()
            .filter(|run| run.is_running())
            .max_by_key(|run| run.started_at)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SimulationRun>, StoreError> {
        Ok(self.runs.read().await.get(id).cloned())
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<SimulationRun>, StoreError> {
        let runs = self.runs.read().await;
        let mut recent: Vec<SimulationRun> = runs.values().cloned().collect();
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        recent.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(recent)
    }

    async fn update(&self, run: SimulationRun) -> Result<SimulationRun, StoreError> {
        let mut runs = self.runs.write().await;
        match runs.get_mut(&run.id) {
            Some(existing) => {
                *existing = run.clone();
                Ok(run)
            }
            None => Err(StoreError::NotFound {
                entity: "simulation run".to_string(),
                id: run.id,
            }),
        }
    }
}

/// Template store backed by a map
#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<String, ReportTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn insert(&self, template: ReportTemplate) -> Result<ReportTemplate, StoreError> {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template.clone());
        Ok(template)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReportTemplate>, StoreError> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<ReportTemplate>, StoreError> {
        let mut templates: Vec<ReportTemplate> = self.templates.read().await.values().cloned().collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }
}
