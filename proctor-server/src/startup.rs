//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::Router;
use proctor_config::ProctorConfig;
use proctor_engine::DEFAULT_SHUTDOWN_GRACE;
use proctor_rest_api::{create_app, AppConfig, AppContext};
use tokio::net::TcpListener;

use crate::services::ServiceContainer;

pub struct Server {
    config: ProctorConfig,
    services: ServiceContainer,
}

impl Server {
    /// Initialise logging and build every service
    pub async fn new(config: ProctorConfig) -> Result<Self> {
        proctor_logging::init_logging(&config.logging)?;
        let services = ServiceContainer::new(&config).await?;
        Ok(Self { config, services })
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.services
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let context = AppContext::new(
            self.services.control.clone(),
            self.services.supervisor.clone(),
            self.services.templates.clone(),
            self.services.jwt.clone(),
            self.services.diagnosis.allowed,
        );

        create_app(
            context,
            AppConfig {
                enable_cors: self.config.server.enable_cors,
                enable_request_id: self.config.server.enable_request_id,
                enable_tracing: self.config.server.enable_tracing,
            },
        )
    }

    /// Bind the configured address and serve until a shutdown signal
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.socket_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        self.log_config_summary();
        let app = self.build_app();
        tracing::info!(addr = %listener.local_addr()?, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.services.engine.shutdown(DEFAULT_SHUTDOWN_GRACE).await;
        if let Some(supervisor) = &self.services.supervisor {
            let sandbox = supervisor.status();
            if sandbox.running {
                tracing::warn!(pid = ?sandbox.pid, port = sandbox.port, "Sandbox server left running");
            }
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        let diagnosis = &self.services.diagnosis;
        tracing::info!("=== Proctor Server Configuration ===");
        tracing::info!("Bind Address: {}", self.config.server.socket_address());
        tracing::info!("Database: {}", diagnosis.db_identity);
        tracing::info!("Mode: {}", if diagnosis.allowed { "sandbox" } else { "primary" });
        tracing::info!("Simulation Control: {}", self.services.control.mode());
        tracing::info!("Target API: {}", self.config.target_base_url());
        tracing::info!("Auth Required: {}", self.config.auth.require_auth);
        tracing::info!("=====================================");
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
