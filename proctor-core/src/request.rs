//! Simulation run input and clamping

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Named behavior mix for the virtual actors of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Teachers browse and open templates, sub-admins browse and poll health
    #[default]
    Mixed,
    /// Every actor only lists templates
    Browse,
    /// Every actor only polls the health endpoint
    Smoke,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Mixed => "mixed",
            Scenario::Browse => "browse",
            Scenario::Smoke => "smoke",
        }
    }

    pub fn all() -> &'static [Scenario] {
        &[Scenario::Mixed, Scenario::Browse, Scenario::Smoke]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mixed" => Ok(Scenario::Mixed),
            "browse" => Ok(Scenario::Browse),
            "smoke" => Ok(Scenario::Smoke),
            other => Err(SimulationError::InvalidRequest(format!(
                "Unknown scenario '{}', expected one of: mixed, browse, smoke",
                other
            ))),
        }
    }
}

/// Raw body of a start request, before clamping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSimulationRequest {
    #[serde(default)]
    pub teachers: Option<i64>,
    #[serde(default)]
    pub sub_admins: Option<i64>,
    #[serde(default)]
    pub duration_sec: Option<i64>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub template: Option<Value>,
}

/// Body of a stop request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSimulationRequest {
    #[serde(default)]
    pub run_id: Option<String>,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRunConfig {
    pub duration_sec: u64,
    pub teachers: u32,
    pub sub_admins: u32,
    pub scenario: Scenario,
    pub template: Option<Value>,
}

/// Bounds applied to every start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationLimits {
    pub min_duration_sec: u64,
    pub max_duration_sec: u64,
    pub default_duration_sec: u64,
    pub max_teachers: u32,
    pub default_teachers: u32,
    pub max_sub_admins: u32,
    pub default_sub_admins: u32,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            min_duration_sec: 10,
            max_duration_sec: 1800,
            default_duration_sec: 60,
            max_teachers: 200,
            default_teachers: 10,
            max_sub_admins: 50,
            default_sub_admins: 2,
        }
    }
}

impl SimulationLimits {
    /// Clamp numeric fields into bounds and validate the rest
    pub fn resolve(&self, request: &StartSimulationRequest) -> Result<SimulationRunConfig> {
        let duration_sec = request
            .duration_sec
            .map(|d| clamp_i64(d, self.min_duration_sec, self.max_duration_sec))
            .unwrap_or(self.default_duration_sec)
            .clamp(self.min_duration_sec, self.max_duration_sec);

        let teachers = request
            .teachers
            .map(|t| clamp_i64(t, 0, u64::from(self.max_teachers)) as u32)
            .unwrap_or(self.default_teachers.min(self.max_teachers));

        let sub_admins = request
            .sub_admins
            .map(|s| clamp_i64(s, 0, u64::from(self.max_sub_admins)) as u32)
            .unwrap_or(self.default_sub_admins.min(self.max_sub_admins));

        let scenario = match request.scenario.as_deref() {
            Some(name) if !name.trim().is_empty() => name.parse()?,
            _ => Scenario::default(),
        };

        let template = match &request.template {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(Value::Object(map.clone())),
            Some(_) => {
                return Err(SimulationError::InvalidRequest(
                    "template must be a JSON object".to_string(),
                ))
            }
        };

        Ok(SimulationRunConfig {
            duration_sec,
            teachers,
            sub_admins,
            scenario,
            template,
        })
    }
}

fn clamp_i64(value: i64, min: u64, max: u64) -> u64 {
    if value <= 0 {
        min
    } else {
        (value as u64).clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamps_to_default_bounds() {
        let limits = SimulationLimits::default();
        let config = limits
            .resolve(&StartSimulationRequest {
                teachers: Some(999),
                sub_admins: Some(-4),
                duration_sec: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.teachers, 200);
        assert_eq!(config.sub_admins, 0);
        assert_eq!(config.duration_sec, 10);
        assert_eq!(config.scenario, Scenario::Mixed);

        let config = limits
            .resolve(&StartSimulationRequest {
                duration_sec: Some(100_000),
                sub_admins: Some(75),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.duration_sec, 1800);
        assert_eq!(config.sub_admins, 50);
    }

    #[test]
    fn test_defaults_when_unspecified() {
        let config = SimulationLimits::default()
            .resolve(&StartSimulationRequest::default())
            .unwrap();
        assert_eq!(config.duration_sec, 60);
        assert_eq!(config.teachers, 10);
        assert_eq!(config.sub_admins, 2);
        assert!(config.template.is_none());
    }

    #[test]
    fn test_custom_limits_allow_short_runs() {
        let limits = SimulationLimits {
            min_duration_sec: 1,
            ..Default::default()
        };
        let config = limits
            .resolve(&StartSimulationRequest {
                duration_sec: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.duration_sec, 2);
    }

    #[test]
    fn test_scenario_validation() {
        let limits = SimulationLimits::default();
        let config = limits
            .resolve(&StartSimulationRequest {
                scenario: Some("Smoke".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.scenario, Scenario::Smoke);

        let err = limits
            .resolve(&StartSimulationRequest {
                scenario: Some("stampede".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn test_template_must_be_object() {
        let limits = SimulationLimits::default();
        let err = limits
            .resolve(&StartSimulationRequest {
                template: Some(json!([1, 2, 3])),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");

        let config = limits
            .resolve(&StartSimulationRequest {
                template: Some(json!({"name": "Term 1"})),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.template.unwrap()["name"], "Term 1");
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: StartSimulationRequest =
            serde_json::from_value(json!({"subAdmins": 3, "durationSec": 30})).unwrap();
        assert_eq!(request.sub_admins, Some(3));
        assert_eq!(request.duration_sec, Some(30));
    }
}
