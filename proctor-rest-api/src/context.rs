//! Dependencies shared by the handlers

use proctor_interfaces::{SandboxSupervisor, TemplateStore};
use proctor_web::JwtManager;
use std::sync::Arc;

use crate::control::SimulationControl;
use crate::errors::{RestError, RestResult};

#[derive(Clone)]
pub struct AppContext {
    /// Strategy for dual-mode control calls
    pub control: Arc<dyn SimulationControl>,
    /// Present only in a primary process
    pub supervisor: Option<Arc<dyn SandboxSupervisor>>,
    pub templates: Arc<dyn TemplateStore>,
    pub jwt: Arc<JwtManager>,
    /// True when the safety gate verified this process as a sandbox
    pub sandbox_mode: bool,
}

impl AppContext {
    pub fn new(
        control: Arc<dyn SimulationControl>,
        supervisor: Option<Arc<dyn SandboxSupervisor>>,
        templates: Arc<dyn TemplateStore>,
        jwt: Arc<JwtManager>,
        sandbox_mode: bool,
    ) -> Self {
        Self {
            control,
            supervisor,
            templates,
            jwt,
            sandbox_mode,
        }
    }

    /// The supervisor lifecycle endpoints act on
    pub fn local_supervisor(&self) -> RestResult<Arc<dyn SandboxSupervisor>> {
        if self.sandbox_mode {
            return Err(RestError::invalid_operation(
                "Sandbox lifecycle cannot be managed from inside the sandbox",
            ));
        }
        self.supervisor
            .clone()
            .ok_or_else(|| RestError::invalid_operation("No sandbox supervisor is configured"))
    }
}
