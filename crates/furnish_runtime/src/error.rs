//! Runtime errors

use std::path::PathBuf;

use furnish_interaction::ConfigError;
use thiserror::Error;

/// Errors from loading a gesture script or the session config
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Script has no steps")]
    Empty,
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;
