use super::db_error;
use crate::connection::DatabaseConnection;
use crate::entities::{simulation_runs, RunStatus, SimulationRunColumn, SimulationRuns};
use async_trait::async_trait;
use proctor_core::SimulationRun;
use proctor_interfaces::{RunStore, StoreError};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

/// SeaORM-backed run store
#[derive(Clone)]
pub struct SeaOrmRunStore {
    db: DatabaseConnection,
}

impl SeaOrmRunStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RunStore for SeaOrmRunStore {
    async fn create(&self, run: SimulationRun) -> Result<SimulationRun, StoreError> {
        let active_model = simulation_runs::to_active_model(&run)?;
        let model = active_model.insert(self.db.get_connection()).await.map_err(db_error)?;
        debug!(run_id = %model.id, "Created simulation run");
        SimulationRun::try_from(model)
    }

    async fn find_running(&self) -> Result<Option<SimulationRun>, StoreError> {
        SimulationRuns::find()
            .filter(SimulationRunColumn::Status.eq(RunStatus::Running))
            .order_by(SimulationRunColumn::StartedAt, Order::Desc)
            .one(self.db.get_connection())
            .await
            .map_err(db_error)?
            .map(SimulationRun::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SimulationRun>, StoreError> {
        SimulationRuns::find_by_id(id.to_string())
            .one(self.db.get_connection())
            .await
            .map_err(db_error)?
            .map(SimulationRun::try_from)
            .transpose()
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<SimulationRun>, StoreError> {
        SimulationRuns::find()
            .order_by(SimulationRunColumn::StartedAt, Order::Desc)
            .limit(limit)
            .all(self.db.get_connection())
            .await
            .map_err(db_error)?
            .into_iter()
            .map(SimulationRun::try_from)
            .collect()
    }

    async fn update(&self, run: SimulationRun) -> Result<SimulationRun, StoreError> {
        let exists = SimulationRuns::find_by_id(run.id.clone())
            .one(self.db.get_connection())
            .await
            .map_err(db_error)?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound {
                entity: "simulation run".to_string(),
                id: run.id,
            });
        }

        let active_model = simulation_runs::to_active_model(&run)?;
        let model = active_model.update(self.db.get_connection()).await.map_err(db_error)?;
        SimulationRun::try_from(model)
    }
}
