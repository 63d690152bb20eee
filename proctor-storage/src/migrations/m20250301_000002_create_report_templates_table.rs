use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportTemplates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportTemplates::Name).string().not_null())
                    .col(ColumnDef::new(ReportTemplates::Definition).json().not_null())
                    .col(
                        ColumnDef::new(ReportTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportTemplates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportTemplates {
    Table,
    Id,
    Name,
    Definition,
    CreatedAt,
}
