use proctor_core::ReportTemplate;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Report card template; only its definition document is stored
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub definition: Json,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReportTemplate> for ActiveModel {
    fn from(template: &ReportTemplate) -> Self {
        Self {
            id: Set(template.id.clone()),
            name: Set(template.name.clone()),
            definition: Set(template.definition.clone()),
            created_at: Set(template.created_at),
        }
    }
}

impl From<Model> for ReportTemplate {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            definition: model.definition,
            created_at: model.created_at,
        }
    }
}
