pub mod run_repository;
pub mod template_repository;

pub use run_repository::SeaOrmRunStore;
pub use template_repository::SeaOrmTemplateStore;

use proctor_interfaces::StoreError;
use sea_orm::DbErr;

/// Map SeaORM errors onto the store error taxonomy
pub(crate) fn db_error(error: DbErr) -> StoreError {
    match error {
        DbErr::Conn(e) => StoreError::Connection { message: e.to_string() },
        DbErr::ConnectionAcquire(e) => StoreError::Connection { message: e.to_string() },
        DbErr::Json(message) => StoreError::Serialization { message },
        other => StoreError::Internal {
            message: other.to_string(),
        },
    }
}
