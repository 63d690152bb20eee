use sea_orm::{ConnectOptions, Database, DatabaseConnection as SeaConnection, DbErr};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Database connection wrapper
#[derive(Clone)]
pub struct DatabaseConnection {
    connection: SeaConnection,
    url: String,
}

/// Database-related errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    DbError(#[from] DbErr),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseConnection {
    /// Connect to `url`, creating the SQLite parent directory when needed
    pub async fn new(url: &str, max_connections: u32, connection_timeout: Duration) -> Result<Self, DatabaseError> {
        info!("Connecting to database: {}", url);

        Self::ensure_sqlite_file_exists(url)?;

        let in_memory = url.contains(":memory:");
        let mut opts = ConnectOptions::new(url);
        opts.min_connections(1)
            .connect_timeout(connection_timeout)
            .acquire_timeout(connection_timeout)
            .sqlx_logging(false);

        if in_memory {
            // Every pooled connection would otherwise see its own empty database
            opts.max_connections(1);
        } else {
            opts.max_connections(max_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(3600));
        }

        let connection = Database::connect(opts).await?;

        debug!(
            "Database connection established with {} max connections",
            if in_memory { 1 } else { max_connections }
        );

        Ok(Self {
            connection,
            url: url.to_string(),
        })
    }

    /// Ensure the directory of a file-based SQLite database exists
    fn ensure_sqlite_file_exists(database_url: &str) -> Result<(), DatabaseError> {
        if !database_url.starts_with("sqlite:") {
            debug!("Non-SQLite database detected, skipping file creation logic");
            return Ok(());
        }
        if database_url.contains(":memory:") {
            debug!("Using in-memory SQLite database");
            return Ok(());
        }

        let file_path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .ok_or_else(|| DatabaseError::ConfigError(format!("Invalid SQLite URL format: {}", database_url)))?;
        let file_path = file_path.split('?').next().unwrap_or_default();
        if file_path.is_empty() {
            return Err(DatabaseError::ConfigError(format!(
                "SQLite URL has no file path: {}",
                database_url
            )));
        }

        let path = std::path::Path::new(file_path);
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                info!("Creating database directory: {:?}", parent_dir);
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    DatabaseError::ConfigError(format!(
                        "Failed to create database directory {:?}: {}",
                        parent_dir, e
                    ))
                })?;
            }
        }

        if path.exists() {
            debug!("Using existing database file: {:?}", path);
        } else {
            info!("Database file will be created by SQLite: {:?}", path);
        }

        Ok(())
    }

    /// Get the underlying Sea-ORM connection
    pub fn get_connection(&self) -> &SeaConnection {
        &self.connection
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        use sea_orm_migration::MigratorTrait;

        info!("Running database migrations");

        crate::migrations::Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Check connectivity
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.connection.ping().await?;
        Ok(())
    }
}
