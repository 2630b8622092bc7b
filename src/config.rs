//! Configuration module for eosible
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/eosible/eosible.toml)
//! - User configuration (~/.eosible.toml)
//! - Project configuration (./eosible.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::telemetry::LoggingConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// eAPI connection settings
    pub connection: ConnectionConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// eAPI scheme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// HTTP over TLS (default)
    #[default]
    Https,
    /// Plain HTTP
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Https => write!(f, "https"),
            Transport::Http => write!(f, "http"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "https" => Ok(Transport::Https),
            "http" => Ok(Transport::Http),
            _ => Err(format!(
                "Invalid transport '{}'. Valid options: https, http",
                s
            )),
        }
    }
}

/// eAPI connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Switch hostname or address
    #[serde(alias = "hostname")]
    pub host: Option<String>,

    /// TCP port (defaults to the transport's well-known port)
    pub port: Option<u16>,

    /// eAPI username
    pub username: String,

    /// eAPI password
    pub password: String,

    /// Password for privileged mode, if one is set
    #[serde(alias = "enable_pwd")]
    pub enable_password: Option<String>,

    /// HTTP or HTTPS
    pub transport: Transport,

    /// Validate the switch's TLS certificate
    pub validate_certs: bool,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: "admin".to_string(),
            password: String::new(),
            enable_password: None,
            transport: Transport::Https,
            validate_certs: true,
            timeout: crate::eapi::client::EAPI_DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from standard locations
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        if let Ok(env_config) = std::env::var("EOSIBLE_CONFIG") {
            return vec![PathBuf::from(env_config)];
        }

        let mut paths = vec![PathBuf::from("/etc/eosible/eosible.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".eosible.toml"));
            paths.push(home.join(".eosible/config.toml"));
        }

        paths.push(PathBuf::from("eosible.toml"));
        paths
    }

    /// Merge configuration from a file
    pub fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; values the other config leaves at
    /// their defaults do not override.
    pub fn merge(&self, other: Config) -> Config {
        let defaults = ConnectionConfig::default();
        let base = &self.connection;
        let over = other.connection;

        Config {
            connection: ConnectionConfig {
                host: over.host.or_else(|| base.host.clone()),
                port: over.port.or(base.port),
                username: if over.username != defaults.username {
                    over.username
                } else {
                    base.username.clone()
                },
                password: if over.password.is_empty() {
                    base.password.clone()
                } else {
                    over.password
                },
                enable_password: over
                    .enable_password
                    .or_else(|| base.enable_password.clone()),
                transport: if over.transport != defaults.transport {
                    over.transport
                } else {
                    base.transport
                },
                validate_certs: over.validate_certs && base.validate_certs,
                timeout: if over.timeout != defaults.timeout {
                    over.timeout
                } else {
                    base.timeout
                },
            },
            logging: if other.logging != LoggingConfig::default() {
                other.logging
            } else {
                self.logging.clone()
            },
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        // EOSIBLE_HOST
        if let Ok(host) = std::env::var("EOSIBLE_HOST") {
            self.connection.host = Some(host);
        }

        // EOSIBLE_PORT
        if let Ok(port) = std::env::var("EOSIBLE_PORT") {
            if let Ok(n) = port.parse() {
                self.connection.port = Some(n);
            }
        }

        // EOSIBLE_USERNAME
        if let Ok(user) = std::env::var("EOSIBLE_USERNAME") {
            self.connection.username = user;
        }

        // EOSIBLE_PASSWORD
        if let Ok(password) = std::env::var("EOSIBLE_PASSWORD") {
            self.connection.password = password;
        }

        // EOSIBLE_TRANSPORT
        if let Ok(transport) = std::env::var("EOSIBLE_TRANSPORT") {
            if let Ok(t) = transport.parse() {
                self.connection.transport = t;
            }
        }

        // EOSIBLE_TIMEOUT
        if let Ok(timeout) = std::env::var("EOSIBLE_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.connection.timeout = n;
            }
        }

        // EOSIBLE_VALIDATE_CERTS
        if let Ok(validate) = std::env::var("EOSIBLE_VALIDATE_CERTS") {
            self.connection.validate_certs = !matches!(
                validate.to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
    }
}
