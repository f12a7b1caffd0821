//! Core error types for tinycare-core.
//!
//! The break scheduler itself cannot fail; errors originate only at the
//! configuration layer and at the care library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tinycare-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration schema
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised while initializing the care library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// A required credential was empty.
    #[error("Missing Twitter credential: {0}")]
    MissingCredential(&'static str),

    /// The library refused the credentials for any other reason.
    #[error("Care library rejected the credentials: {0}")]
    Rejected(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
