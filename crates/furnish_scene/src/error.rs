//! Error types for the scene collaborators

use thiserror::Error;

use crate::handle::{ModelId, ObjectHandle};

/// Scene graph errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Scene node not found: {0}")]
    UnknownHandle(ObjectHandle),

    /// Model id was never resolved by this scene
    #[error("Model not loaded: {0}")]
    UnknownModel(ModelId),

    /// Child is not attached to the given parent
    #[error("{child} is not a child of {parent}")]
    NotAChild {
        parent: ObjectHandle,
        child: ObjectHandle,
    },

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child} under {parent} would create a cycle")]
    Cycle {
        parent: ObjectHandle,
        child: ObjectHandle,
    },

    /// Model could not be resolved
    #[error("Failed to load model '{name}': {reason}")]
    LoadFailed { name: String, reason: String },
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
