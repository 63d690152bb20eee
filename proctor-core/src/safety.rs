//! Safety gate for destructive load simulations
//!
//! A simulation may only run when the process has been explicitly opted in
//! AND the active database positively identifies itself as disposable, either
//! by carrying the configured marker or the word `test` in its connection
//! string or resolved name.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const TEST_TOKEN: &str = "test";

/// Outcome of evaluating the gate, returned verbatim by diagnostics endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDiagnosis {
    pub allowed: bool,
    pub flag: bool,
    pub marker: String,
    pub marker_match: bool,
    pub test_match: bool,
    pub db_identity: String,
    pub connection_string: String,
}

/// Pure decision over the process configuration. Built once, never does I/O.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    enabled: bool,
    marker: String,
    connection_string: String,
    db_identity: String,
}

impl SafetyGate {
    pub fn new(enabled: bool, marker: impl Into<String>, connection_string: impl Into<String>) -> Self {
        let connection_string = connection_string.into();
        let db_identity = resolve_database_name(&connection_string);
        Self {
            enabled,
            marker: marker.into(),
            connection_string,
            db_identity,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn db_identity(&self) -> &str {
        &self.db_identity
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn diagnose(&self) -> SafetyDiagnosis {
        let connection = self.connection_string.to_lowercase();
        let name = self.db_identity.to_lowercase();
        let marker = self.marker.trim().to_lowercase();

        let marker_match = !marker.is_empty() && (connection.contains(&marker) || name.contains(&marker));
        let test_match = connection.contains(TEST_TOKEN) || name.contains(TEST_TOKEN);

        SafetyDiagnosis {
            allowed: self.enabled && (marker_match || test_match),
            flag: self.enabled,
            marker: self.marker.clone(),
            marker_match,
            test_match,
            db_identity: self.db_identity.clone(),
            connection_string: self.connection_string.clone(),
        }
    }

    /// Fail with `simulation_not_allowed` unless the gate is open
    pub fn assert(&self) -> Result<SafetyDiagnosis> {
        let diagnosis = self.diagnose();
        if diagnosis.allowed {
            Ok(diagnosis)
        } else {
            Err(SimulationError::NotAllowed {
                db_identity: diagnosis.db_identity,
                connection_string: diagnosis.connection_string,
            })
        }
    }
}

/// Resolve the logical database name from a connection string.
///
/// SQLite URLs resolve to the file stem (`memory` for in-memory databases),
/// server URLs to their last path segment, anything else to the empty string.
pub fn resolve_database_name(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if let Some(prefix) = trimmed.get(..7) {
        if prefix.eq_ignore_ascii_case("sqlite:") {
            return sqlite_database_name(&trimmed[7..]);
        }
    }

    match url::Url::parse(trimmed) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn sqlite_database_name(rest: &str) -> String {
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path.eq_ignore_ascii_case(":memory:") || path.eq_ignore_ascii_case("memory") {
        return "memory".to_string();
    }

    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
