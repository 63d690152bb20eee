use proctor_core::{RecentAction, SimulationRun};
use proctor_interfaces::StoreError;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Run status as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RunStatus {
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "stopped")]
    Stopped,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<proctor_core::RunStatus> for RunStatus {
    fn from(status: proctor_core::RunStatus) -> Self {
        match status {
            proctor_core::RunStatus::Running => RunStatus::Running,
            proctor_core::RunStatus::Stopped => RunStatus::Stopped,
            proctor_core::RunStatus::Completed => RunStatus::Completed,
            proctor_core::RunStatus::Failed => RunStatus::Failed,
        }
    }
}

impl From<RunStatus> for proctor_core::RunStatus {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Running => proctor_core::RunStatus::Running,
            RunStatus::Stopped => proctor_core::RunStatus::Stopped,
            RunStatus::Completed => proctor_core::RunStatus::Completed,
            RunStatus::Failed => proctor_core::RunStatus::Failed,
        }
    }
}

/// One load simulation run
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "simulation_runs")]
pub struct Model {
    /// Run UUID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub status: RunStatus,

    pub scenario: String,

    pub started_at: ChronoDateTimeUtc,

    pub ended_at: Option<ChronoDateTimeUtc>,

    pub requested_duration_sec: i64,

    pub teachers: i32,

    pub sub_admins: i32,

    pub template_name: Option<String>,

    pub sandbox_template_id: Option<String>,

    pub sandbox: bool,

    pub sandbox_marker: String,

    /// Final result payload, written once at finalization
    pub summary: Option<Json>,

    /// Progress snapshot, rewritten by the periodic flush
    pub last_metrics: Json,

    /// Bounded list of recent actions as a JSON array
    pub recent_actions: Json,

    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Build a fully-set active model from a domain run
pub fn to_active_model(run: &SimulationRun) -> Result<ActiveModel, StoreError> {
    let recent_actions = serde_json::to_value(&run.recent_actions).map_err(|e| StoreError::Serialization {
        message: format!("recent actions of run {}: {}", run.id, e),
    })?;

    Ok(ActiveModel {
        id: Set(run.id.clone()),
        status: Set(run.status.into()),
        scenario: Set(run.scenario.clone()),
        started_at: Set(run.started_at),
        ended_at: Set(run.ended_at),
        requested_duration_sec: Set(run.requested_duration_sec as i64),
        teachers: Set(run.teachers as i32),
        sub_admins: Set(run.sub_admins as i32),
        template_name: Set(run.template_name.clone()),
        sandbox_template_id: Set(run.sandbox_template_id.clone()),
        sandbox: Set(run.sandbox),
        sandbox_marker: Set(run.sandbox_marker.clone()),
        summary: Set(run.summary.clone()),
        last_metrics: Set(run.last_metrics.clone()),
        recent_actions: Set(recent_actions),
        error: Set(run.error.clone()),
    })
}

impl TryFrom<Model> for SimulationRun {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let recent_actions: Vec<RecentAction> =
            serde_json::from_value(model.recent_actions).map_err(|e| StoreError::Serialization {
                message: format!("recent actions of run {}: {}", model.id, e),
            })?;

        Ok(SimulationRun {
            id: model.id,
            status: model.status.into(),
            scenario: model.scenario,
            started_at: model.started_at,
            ended_at: model.ended_at,
            requested_duration_sec: model.requested_duration_sec.max(0) as u64,
            teachers: model.teachers.max(0) as u32,
            sub_admins: model.sub_admins.max(0) as u32,
            template_name: model.template_name,
            sandbox_template_id: model.sandbox_template_id,
            sandbox: model.sandbox,
            sandbox_marker: model.sandbox_marker,
            summary: model.summary,
            last_metrics: model.last_metrics,
            recent_actions,
            error: model.error,
        })
    }
}
