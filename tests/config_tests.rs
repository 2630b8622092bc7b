//! Integration tests for configuration loading
//!
//! Covers TOML, YAML and JSON files, merging over defaults and environment
//! overrides.

use eosible::config::{Config, ConnectionConfig, Transport};
use eosible::telemetry::{LogFormat, LogLevel, LoggingConfig};
use serial_test::serial;
use tempfile::tempdir;

const ENV_KEYS: &[&str] = &[
    "EOSIBLE_CONFIG",
    "EOSIBLE_HOST",
    "EOSIBLE_PORT",
    "EOSIBLE_USERNAME",
    "EOSIBLE_PASSWORD",
    "EOSIBLE_TRANSPORT",
    "EOSIBLE_TIMEOUT",
    "EOSIBLE_VALIDATE_CERTS",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

// ============================================================================
// File formats
// ============================================================================

#[test]
#[serial]
fn test_load_toml_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("eosible.toml");
    std::fs::write(
        &path,
        r#"
[connection]
host = "veos01"
username = "automation"
password = "secret"
transport = "http"
timeout = 10

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.connection.host.as_deref(), Some("veos01"));
    assert_eq!(config.connection.username, "automation");
    assert_eq!(config.connection.password, "secret");
    assert_eq!(config.connection.transport, Transport::Http);
    assert_eq!(config.connection.timeout, 10);
    assert!(config.connection.validate_certs);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_load_yaml_file_with_aliases() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("eosible.yml");
    std::fs::write(
        &path,
        "connection:\n  hostname: veos02\n  enable_pwd: enable\n  port: 8443\n  validate_certs: false\n",
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.connection.host.as_deref(), Some("veos02"));
    assert_eq!(config.connection.enable_password.as_deref(), Some("enable"));
    assert_eq!(config.connection.port, Some(8443));
    assert!(!config.connection.validate_certs);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
#[serial]
fn test_load_json_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("eosible.json");
    std::fs::write(&path, r#"{"connection": {"host": "veos03"}}"#).unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.connection.host.as_deref(), Some("veos03"));
    assert_eq!(config.connection.username, "admin");
}

#[test]
#[serial]
fn test_missing_explicit_file_yields_defaults() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("eosible.toml");
    std::fs::write(&path, "[connection\nhost = ").unwrap();
    assert!(Config::load(Some(&path)).is_err());
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("eosible.toml");
    std::fs::write(&path, "[connection]\nhost = \"veos01\"\ntimeout = 10\n").unwrap();

    std::env::set_var("EOSIBLE_HOST", "veos09");
    std::env::set_var("EOSIBLE_TRANSPORT", "http");
    std::env::set_var("EOSIBLE_TIMEOUT", "not-a-number");
    let config = Config::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.connection.host.as_deref(), Some("veos09"));
    assert_eq!(config.connection.transport, Transport::Http);
    assert_eq!(config.connection.timeout, 10);
}

#[test]
#[serial]
fn test_env_config_path_is_used() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("from-env.toml");
    std::fs::write(&path, "[connection]\nhost = \"veos-env\"\n").unwrap();

    std::env::set_var("EOSIBLE_CONFIG", &path);
    let config = Config::load(None).unwrap();
    clear_env();

    assert_eq!(config.connection.host.as_deref(), Some("veos-env"));
}

#[test]
fn test_later_file_keeps_earlier_values() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("site.toml");
    let local = dir.path().join("local.toml");
    std::fs::write(&site, "[connection]\nhost = \"veos01\"\npassword = \"secret\"\n").unwrap();
    std::fs::write(&local, "[connection]\nusername = \"ops\"\n").unwrap();

    let config = Config::default()
        .merge_from_file(&site)
        .unwrap()
        .merge_from_file(&local)
        .unwrap();

    assert_eq!(
        config.connection,
        ConnectionConfig {
            host: Some("veos01".to_string()),
            username: "ops".to_string(),
            password: "secret".to_string(),
            ..ConnectionConfig::default()
        }
    );
}
