//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic, locally detectable failures: field validation and
/// invariants. Lookups and conflicts are reported by the storage layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but malformed.
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Name of the offending field, for field-level validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}
