//! Domain-level errors.
//!
//! Raised by pure domain code before anything reaches a store.

use thiserror::Error;

/// Domain-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identifier text that is not a valid 24 character hex id
    #[error("invalid identifier '{raw}': {reason}")]
    InvalidId { raw: String, reason: String },
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
