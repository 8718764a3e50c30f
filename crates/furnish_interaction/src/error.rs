//! Configuration errors
//!
//! Runtime collaborator failures never reach the caller; they are logged
//! and absorbed by the session. Only loading a config can fail.

use thiserror::Error;

/// Errors from loading an [`InteractionConfig`](crate::InteractionConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;
