//! Errors raised while modeling.

use bpmn_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelingError {
    /// Malformed registration or command input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The semantic tree cannot hold the requested structure.
    #[error("{0}")]
    InvalidModel(String),

    #[error("id <{0}> already used")]
    IdConflict(String),

    /// The operation is not possible in the current state.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("element <{0}> not found")]
    ElementNotFound(String),
}

impl From<CoreError> for ModelingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IdConflict(id) => ModelingError::IdConflict(id),
            CoreError::ElementNotFound(id) => ModelingError::ElementNotFound(id.to_string()),
            CoreError::DuplicateElement(id) => ModelingError::IdConflict(id.to_string()),
        }
    }
}
