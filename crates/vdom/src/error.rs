//! Error types for tree lookups
//!
//! Mutation never fails. Only identity-based lookups can miss.

use thiserror::Error;

use crate::types::ElementId;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
}
