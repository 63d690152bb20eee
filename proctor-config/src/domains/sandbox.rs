//! Sandbox server build and log configuration
//!
//! The sandbox port and database URL are deliberately absent: they are
//! constants of the sandbox supervisor and cannot be pointed elsewhere.

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sandbox server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Program that builds the sandbox server artifact
    pub build_program: String,

    /// Arguments passed to `build_program`
    pub build_args: Vec<String>,

    /// Directory the build runs in and relative paths resolve against
    pub working_dir: PathBuf,

    /// Entry artifact produced by the build; spawned as the sandbox server
    pub artifact_path: PathBuf,

    /// Directory receiving the sandbox stdout/stderr log files
    pub log_dir: PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            build_program: "cargo".to_string(),
            build_args: vec![
                "build".to_string(),
                "--release".to_string(),
                "-p".to_string(),
                "proctor-server".to_string(),
            ],
            working_dir: PathBuf::from("."),
            artifact_path: PathBuf::from("target/release/proctor-server"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl SandboxConfig {
    /// Artifact path resolved against the working directory
    pub fn resolved_artifact_path(&self) -> PathBuf {
        if self.artifact_path.is_absolute() {
            self.artifact_path.clone()
        } else {
            self.working_dir.join(&self.artifact_path)
        }
    }

    /// Log directory resolved against the working directory
    pub fn resolved_log_dir(&self) -> PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            self.working_dir.join(&self.log_dir)
        }
    }
}

impl Validatable for SandboxConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.build_program, "build_program", self.domain_name())?;
        if self.artifact_path.as_os_str().is_empty() {
            return Err(self.validation_error("artifact_path cannot be empty"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sandbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_resolve_against_working_dir() {
        let config = SandboxConfig {
            working_dir: PathBuf::from("/srv/proctor"),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_artifact_path(),
            PathBuf::from("/srv/proctor/target/release/proctor-server")
        );
        assert_eq!(config.resolved_log_dir(), PathBuf::from("/srv/proctor/logs"));
    }

    #[test]
    fn test_absolute_artifact_path_is_kept() {
        let config = SandboxConfig {
            working_dir: PathBuf::from("/srv/proctor"),
            artifact_path: PathBuf::from("/opt/bin/proctor-server"),
            ..Default::default()
        };
        assert_eq!(config.resolved_artifact_path(), PathBuf::from("/opt/bin/proctor-server"));
    }
}
