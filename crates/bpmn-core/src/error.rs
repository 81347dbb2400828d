//! Errors raised by the core data structures.

use thiserror::Error;

use crate::id::ElementId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Claiming an id that is already claimed.
    #[error("id <{0}> already used")]
    IdConflict(String),

    #[error("element <{0}> not found")]
    ElementNotFound(ElementId),

    /// Adding an element whose id is already registered.
    #[error("element <{0}> already added")]
    DuplicateElement(ElementId),
}
