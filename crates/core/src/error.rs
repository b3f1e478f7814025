//! Domain and execution error model.

use thiserror::Error;

/// Result type used across the pure domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type of execute-phase logic.
pub type ExecResult<T> = Result<T, ExecutionError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Infrastructure
/// concerns belong elsewhere. Bad *input* is never a `DomainError`: it is
/// reported as field-scoped validation data before any domain logic runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Fault raised while executing an already-validated request.
///
/// The variants are the façade's branching points: it maps them to status
/// codes by type, never by inspecting the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The target entity vanished between validation and execution.
    #[error("{kind} '{id}' was not found")]
    NotFound { kind: &'static str, id: String },

    /// A concurrent modification or duplicate write was detected on save.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was cancelled at an I/O boundary.
    #[error("request was cancelled")]
    Cancelled,

    /// Anything else (broken invariant, storage failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecutionError {
    pub fn not_found(kind: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<DomainError> for ExecutionError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvariantViolation(msg) | DomainError::InvalidId(msg) => {
                ExecutionError::Internal(msg)
            }
        }
    }
}
