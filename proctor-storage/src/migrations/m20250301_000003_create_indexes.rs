use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Running-run lookups
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_simulation_runs_status")
                    .table(SimulationRuns::Table)
                    .col(SimulationRuns::Status)
                    .to_owned(),
            )
            .await?;

        // History ordering
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_simulation_runs_started_at")
                    .table(SimulationRuns::Table)
                    .col(SimulationRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_report_templates_created_at")
                    .table(ReportTemplates::Table)
                    .col(ReportTemplates::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_report_templates_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_simulation_runs_started_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_simulation_runs_status").to_owned())
            .await
    }
}

#[derive(Iden)]
enum SimulationRuns {
    Table,
    Status,
    StartedAt,
}

#[derive(Iden)]
enum ReportTemplates {
    Table,
    CreatedAt,
}
