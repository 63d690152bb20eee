//! Report templates seeded into the sandbox database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity and bookkeeping keys dropped before a template is re-inserted
const IDENTITY_FIELDS: [&str; 6] = ["id", "_id", "uuid", "createdAt", "updatedAt", "__v"];

const UNNAMED_TEMPLATE: &str = "Simulation template";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub definition: Value,
    pub created_at: DateTime<Utc>,
}

impl ReportTemplate {
    /// Build a fresh template from an inline definition, discarding any
    /// identity it carried.
    pub fn from_definition(definition: &Value) -> Self {
        let definition = strip_identity_fields(definition);
        let name = definition
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNNAMED_TEMPLATE)
            .to_string();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            definition,
            created_at: Utc::now(),
        }
    }
}

/// Remove top-level identity fields from a template definition
pub fn strip_identity_fields(definition: &Value) -> Value {
    match definition {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !IDENTITY_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_fields_are_stripped() {
        let definition = json!({
            "_id": "65f0",
            "id": 7,
            "uuid": "abc",
            "createdAt": "2024-01-01",
            "updatedAt": "2024-01-02",
            "__v": 3,
            "name": "Term report",
            "sections": [{"id": "kept-nested"}]
        });

        let stripped = strip_identity_fields(&definition);
        let keys: Vec<&String> = stripped.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(stripped["name"], "Term report");
        assert_eq!(stripped["sections"][0]["id"], "kept-nested");
    }

    #[test]
    fn test_from_definition_assigns_fresh_identity() {
        let template = ReportTemplate::from_definition(&json!({"id": "old", "name": "Midterm"}));
        assert_ne!(template.id, "old");
        assert_eq!(template.name, "Midterm");
        assert!(template.definition.get("id").is_none());

        let unnamed = ReportTemplate::from_definition(&json!({"layout": "grid"}));
        assert_eq!(unnamed.name, "Simulation template");
    }
}
