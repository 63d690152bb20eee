//! Integration tests for proctor-config

use proctor_config::*;
use std::io::Write;
use std::path::PathBuf;
use temp_env::with_vars;

const ALL_VARS: [&str; 15] = [
    "PROCTOR_BIND_ADDRESS",
    "PROCTOR_PORT",
    "PROCTOR_DATABASE_URL",
    "PROCTOR_SIMULATION_ENABLED",
    "PROCTOR_SIMULATION_MARKER",
    "PROCTOR_TARGET_PROTOCOL",
    "PROCTOR_TARGET_HOST",
    "PROCTOR_TARGET_PORT",
    "PROCTOR_JWT_SECRET",
    "PROCTOR_JWT_ISSUER",
    "PROCTOR_JWT_AUDIENCE",
    "PROCTOR_REQUIRE_AUTH",
    "PROCTOR_LOG_LEVEL",
    "PROCTOR_LOG_FORMAT",
    "PROCTOR_SANDBOX_LOG_DIR",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    ALL_VARS.iter().map(|name| (*name, None)).collect()
}

#[test]
fn test_from_env_defaults() {
    with_vars(cleared(), || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert_eq!(config.server.port, 3100);
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.marker, "sandbox");
        assert_eq!(config.target_base_url(), "http://127.0.0.1:3100");
    });
}

#[test]
fn test_sandbox_style_overrides() {
    let mut vars = cleared();
    vars.retain(|(name, _)| {
        !matches!(
            *name,
            "PROCTOR_PORT"
                | "PROCTOR_DATABASE_URL"
                | "PROCTOR_SIMULATION_ENABLED"
                | "PROCTOR_SIMULATION_MARKER"
                | "PROCTOR_TARGET_PORT"
                | "PROCTOR_LOG_LEVEL"
                | "PROCTOR_SANDBOX_LOG_DIR"
        )
    });
    vars.extend([
        ("PROCTOR_PORT", Some("3101")),
        ("PROCTOR_DATABASE_URL", Some("sqlite://data/proctor_sandbox.db?mode=rwc")),
        ("PROCTOR_SIMULATION_ENABLED", Some("true")),
        ("PROCTOR_SIMULATION_MARKER", Some("sbx")),
        ("PROCTOR_TARGET_PORT", Some("3101")),
        ("PROCTOR_LOG_LEVEL", Some("debug")),
        ("PROCTOR_SANDBOX_LOG_DIR", Some("/tmp/proctor-logs")),
    ]);

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert_eq!(config.server.port, 3101);
        assert_eq!(config.database.url, "sqlite://data/proctor_sandbox.db?mode=rwc");
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.marker, "sbx");
        assert_eq!(config.target.port, Some(3101));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.sandbox.log_dir, PathBuf::from("/tmp/proctor-logs"));
    });
}

#[test]
fn test_token_identity_overrides() {
    let mut vars = cleared();
    vars.retain(|(name, _)| !name.starts_with("PROCTOR_JWT_"));
    vars.extend([
        ("PROCTOR_JWT_SECRET", Some("shared")),
        ("PROCTOR_JWT_ISSUER", Some("school")),
        ("PROCTOR_JWT_AUDIENCE", Some("school-admins")),
    ]);

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert_eq!(config.auth.jwt_secret, "shared");
        assert_eq!(config.auth.issuer, "school");
        assert_eq!(config.auth.audience, "school-admins");
    });
}

#[test]
fn test_invalid_env_values_are_rejected() {
    let mut vars = cleared();
    vars.retain(|(name, _)| *name != "PROCTOR_PORT");
    vars.push(("PROCTOR_PORT", Some("not-a-port")));
    with_vars(vars, || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    });

    let mut vars = cleared();
    vars.retain(|(name, _)| *name != "PROCTOR_SIMULATION_ENABLED");
    vars.push(("PROCTOR_SIMULATION_ENABLED", Some("perhaps")));
    with_vars(vars, || {
        assert!(ConfigLoader::new().from_env().is_err());
    });
}

#[test]
fn test_yaml_file_with_env_override() {
    let yaml = r#"
server:
  bind_address: "0.0.0.0"
  port: 8080
database:
  url: "sqlite::memory:"
simulation:
  enabled: true
  marker: "loadtest"
target:
  protocol: https
  host: "api.internal"
  port: 443
logging:
  level: warn
  format: json
"#;
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let mut vars = cleared();
    vars.retain(|(name, _)| *name != "PROCTOR_PORT");
    vars.push(("PROCTOR_PORT", Some("9090")));
    with_vars(vars, || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.marker, "loadtest");
        assert_eq!(config.target_base_url(), "https://api.internal:443");
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let yaml = r#"
target:
  protocol: ftp
"#;
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(cleared(), || {
        let err = ConfigLoader::new().from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { ref domain, .. } if domain == "target"));
    });
}

#[test]
fn test_yaml_round_trip_is_valid() {
    let config = ProctorConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: ProctorConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
}
