pub mod report_templates;
pub mod simulation_runs;

pub use report_templates::{
    ActiveModel as ReportTemplateActiveModel, Column as ReportTemplateColumn, Entity as ReportTemplates,
    Model as ReportTemplateModel,
};
pub use simulation_runs::{
    ActiveModel as SimulationRunActiveModel, Column as SimulationRunColumn, Entity as SimulationRuns,
    Model as SimulationRunModel, RunStatus,
};
