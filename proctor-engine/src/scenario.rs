//! What each virtual actor does under each scenario

use proctor_core::Scenario;
use proctor_interfaces::ActorRole;

/// One synthetic call against the application API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// `GET /api/templates`
    ListTemplates,
    /// `GET /api/templates/{id}` for a template seen in an earlier listing
    OpenTemplate,
    /// `GET /health`
    Health,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::ListTemplates => "list_templates",
            ActionKind::OpenTemplate => "open_template",
            ActionKind::Health => "health",
        }
    }
}

/// Actions an actor cycles through, in order
pub fn action_plan(scenario: Scenario, role: ActorRole) -> &'static [ActionKind] {
    match (scenario, role) {
        (Scenario::Mixed, ActorRole::Teacher) => &[ActionKind::ListTemplates, ActionKind::OpenTemplate],
        (Scenario::Mixed, ActorRole::SubAdmin) => &[ActionKind::ListTemplates, ActionKind::Health],
        (Scenario::Browse, _) => &[ActionKind::ListTemplates],
        (Scenario::Smoke, _) => &[ActionKind::Health],
    }
}
