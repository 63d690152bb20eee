//! # Proctor REST API
//!
//! The admin-only simulation control surface plus the small application API
//! that virtual actors exercise.
//!
//! ## Architecture
//!
//! Simulation-control calls go through a [`SimulationControl`] strategy that
//! is chosen once at startup: a primary process forwards every call to its
//! sandbox server with [`ProxyControl`], while the sandbox server itself
//! answers them with [`LocalControl`] against the run engine. Sandbox
//! lifecycle calls never go through the strategy; they always run against the
//! local supervisor.
//!
//! ## Example
//!
//! ```rust,no_run
//! use proctor_rest_api::{create_app, AppConfig, AppContext};
//!
//! # async fn example(context: AppContext) -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(context, AppConfig::default());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3100").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod context;
pub mod control;
pub mod errors;
pub mod handlers;
pub mod models;

pub use app::{create_app, AppConfig, SIMULATIONS_PREFIX};
pub use context::AppContext;
pub use control::{select_control, ControlOp, ControlReply, ControlRequest, LocalControl, ProxyControl, SimulationControl};
pub use errors::{RestError, RestResult};
