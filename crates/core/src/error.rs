//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Every
/// operation in the core returns its failure to the caller; nothing here is
/// swallowed or retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Authorization denied. Always surfaced to the caller, never downgraded.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The target entity is absent.
    #[error("not found")]
    NotFound,

    /// Restore/purge attempted on an entity that is not in the trash.
    #[error("not in trash")]
    NotInTrash,

    /// Malformed authorization input (e.g. a resource reference without an
    /// institution). Programmer error; log loudly, do not mask.
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// The acting account id does not resolve to any account.
    #[error("unknown actor: {0}")]
    UnknownActor(String),

    /// Unique-constraint violation (duplicate registration number, duplicate
    /// email, duplicate membership pair). Surfaced verbatim for correction.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_resource(msg: impl Into<String>) -> Self {
        Self::InvalidResource(msg.into())
    }

    pub fn unknown_actor(msg: impl Into<String>) -> Self {
        Self::UnknownActor(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
