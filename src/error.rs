//! Error types for eosible.
//!
//! A missing configuration block is never an error: parsers report it as an
//! absent record. Everything in this module is a genuine failure, split into
//! resource-scoped failures (which abort one resource) and transport failures
//! (which propagate to the caller unchanged).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for eosible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for eosible.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Malformed or insufficiently identifying resource input.
    #[error("Invalid {resource} resource: {message}")]
    Validation {
        /// Resource family or identity the input belongs to
        resource: String,
        /// Error message
        message: String,
    },

    /// Device output did not have the expected shape.
    #[error("Failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Error message
        message: String,
    },

    /// The device replied with fewer or non-empty acknowledgements.
    #[error("Device did not acknowledge {} command(s): {}", commands.len(), commands.join("; "))]
    NotAcknowledged {
        /// Commands that were issued
        commands: Vec<String>,
        /// Number of replies received
        replies: usize,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The eAPI transport failed before a reply was produced.
    #[error("eAPI transport error: {0}")]
    Transport(String),

    /// The device rejected a command batch.
    #[error("eAPI error {code}: {message}")]
    Eapi {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
        /// Per-command error strings reported by the device
        errors: Vec<String>,
    },

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Manifest Errors
    // ========================================================================
    /// Error loading a resource manifest.
    #[error("Failed to load manifest '{path}': {message}")]
    Manifest {
        /// Path to the manifest file
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // I/O and Serialization Errors
    // ========================================================================
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Creates a validation error for a resource.
    pub fn validation(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport(message.into())
    }

    /// Returns true if the failure is confined to a single resource and the
    /// run may continue with the next one.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::Parse { .. }
                | Error::NotAcknowledged { .. }
                | Error::Eapi { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation { .. } | Error::Parse { .. } => 2,
            Error::Transport(_) | Error::Http(_) => 3,
            Error::Eapi { .. } | Error::NotAcknowledged { .. } => 4,
            Error::Manifest { .. } => 5,
            Error::Config(_) | Error::InvalidConfig { .. } => 6,
            _ => 1,
        }
    }
}
