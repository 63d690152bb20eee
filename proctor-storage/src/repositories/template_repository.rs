use super::db_error;
use crate::connection::DatabaseConnection;
use crate::entities::{ReportTemplateActiveModel, ReportTemplateColumn, ReportTemplates};
use async_trait::async_trait;
use proctor_core::ReportTemplate;
use proctor_interfaces::{StoreError, TemplateStore};
use sea_orm::{ActiveModelTrait, EntityTrait, Order, QueryOrder};

/// SeaORM-backed template store
#[derive(Clone)]
pub struct SeaOrmTemplateStore {
    db: DatabaseConnection,
}

impl SeaOrmTemplateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TemplateStore for SeaOrmTemplateStore {
    async fn insert(&self, template: ReportTemplate) -> Result<ReportTemplate, StoreError> {
        let active_model = ReportTemplateActiveModel::from(&template);
        let model = active_model.insert(self.db.get_connection()).await.map_err(db_error)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReportTemplate>, StoreError> {
        let model = ReportTemplates::find_by_id(id.to_string())
            .one(self.db.get_connection())
            .await
            .map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<ReportTemplate>, StoreError> {
        let models = ReportTemplates::find()
            .order_by(ReportTemplateColumn::CreatedAt, Order::Desc)
            .all(self.db.get_connection())
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
