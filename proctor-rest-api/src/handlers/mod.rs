pub mod health;
pub mod sandbox;
pub mod simulations;
pub mod templates;

pub use health::health_check;
pub use sandbox::{sandbox_start, sandbox_status, sandbox_stop};
pub use simulations::{get_run, run_history, simulation_status, start_run, stop_run};
pub use templates::{get_template, list_templates};
