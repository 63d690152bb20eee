use sea_orm_migration::prelude::*;

mod m20250301_000001_create_simulation_runs_table;
mod m20250301_000002_create_report_templates_table;
mod m20250301_000003_create_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_simulation_runs_table::Migration),
            Box::new(m20250301_000002_create_report_templates_table::Migration),
            Box::new(m20250301_000003_create_indexes::Migration),
        ]
    }
}
