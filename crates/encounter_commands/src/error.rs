//! Error types for store calls and commands.

use encounter_model::{EntityIndex, EntityKind};
use thiserror::Error;

/// Failure reported by a store collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("No {kind} at index {index}")]
    NotFound { kind: EntityKind, index: EntityIndex },

    #[error("Rejected by store: {0}")]
    Rejected(String),

    #[error("Store unavailable")]
    Unavailable,
}

/// Result type for store collaborator calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while executing, undoing or redoing a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// A collaborator call failed; passed through unchanged.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An inverse was requested but the command holds no captured index.
    #[error("Nothing to invert for '{0}'")]
    NotExecuted(String),

    /// The in-flight operation of a fire-and-forget command never settled.
    #[error("Placement task failed: {0}")]
    Placement(String),

    /// The command was built from unusable input.
    #[error("Invalid command: {0}")]
    Invalid(String),
}

impl CommandError {
    /// The underlying store failure, if this error is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CommandError::Store(err) => Some(err),
            _ => None,
        }
    }
}
