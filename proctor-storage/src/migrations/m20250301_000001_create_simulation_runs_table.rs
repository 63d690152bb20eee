use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No unique constraint on status: the single running run is enforced by the engine
        manager
            .create_table(
                Table::create()
                    .table(SimulationRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimulationRuns::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SimulationRuns::Status)
                            .string_len(20)
                            .not_null()
                            .default("running"),
                    )
                    .col(ColumnDef::new(SimulationRuns::Scenario).string().not_null())
                    .col(
                        ColumnDef::new(SimulationRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SimulationRuns::EndedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(SimulationRuns::RequestedDurationSec)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SimulationRuns::Teachers).integer().not_null())
                    .col(ColumnDef::new(SimulationRuns::SubAdmins).integer().not_null())
                    .col(ColumnDef::new(SimulationRuns::TemplateName).string())
                    .col(ColumnDef::new(SimulationRuns::SandboxTemplateId).string())
                    .col(
                        ColumnDef::new(SimulationRuns::Sandbox)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SimulationRuns::SandboxMarker).string().not_null())
                    .col(ColumnDef::new(SimulationRuns::Summary).json())
                    .col(ColumnDef::new(SimulationRuns::LastMetrics).json().not_null())
                    .col(ColumnDef::new(SimulationRuns::RecentActions).json().not_null())
                    .col(ColumnDef::new(SimulationRuns::Error).text())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimulationRuns::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SimulationRuns {
    Table,
    Id,
    Status,
    Scenario,
    StartedAt,
    EndedAt,
    RequestedDurationSec,
    Teachers,
    SubAdmins,
    TemplateName,
    SandboxTemplateId,
    Sandbox,
    SandboxMarker,
    Summary,
    LastMetrics,
    RecentActions,
    Error,
}
