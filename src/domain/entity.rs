//! Domain Layer - Core Entity Trait and Errors
//!
//! The Entity trait is the basic contract for all domain entities: a
//! UUID-formatted identifier assigned by the remote service, plus the
//! name of the remote table the entity lives in.

use serde::Serialize;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Remote table this entity is stored in
    const TABLE: &'static str;

    /// Returns the entity's unique identifier (UUID text)
    fn id(&self) -> &str;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Why a single field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationFault {
    /// Not canonical UUID text / not a recognized date
    InvalidFormat,
    /// Required field missing or empty
    Required,
    /// String longer than the allowed maximum
    TooLong(usize),
    /// Not a member of the allowed tag set
    InvalidValue,
    /// Integer outside the allowed range
    OutOfRange(i64, i64),
    /// Target identifier of an update/delete is not a UUID
    InvalidId,
}

impl std::fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFault::InvalidFormat => write!(f, "invalid format"),
            ValidationFault::Required => write!(f, "required"),
            ValidationFault::TooLong(max) => write!(f, "longer than {} characters", max),
            ValidationFault::InvalidValue => write!(f, "not an allowed value"),
            ValidationFault::OutOfRange(min, max) => write!(f, "must be between {} and {}", min, max),
            ValidationFault::InvalidId => write!(f, "not a valid identifier"),
        }
    }
}

/// Domain-level errors
///
/// Every mutation returns one of these instead of panicking past the
/// service boundary. `Remote` carries the persistence service's message
/// verbatim; callers surface it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed on `{field}`: {fault}")]
    Validation {
        field: String,
        fault: ValidationFault,
    },
    #[error("{message}")]
    RateLimited {
        message: String,
        /// Seconds until the oldest in-window request expires
        retry_after_secs: Option<u64>,
    },
    #[error("{0}")]
    Remote(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, fault: ValidationFault) -> Self {
        DomainError::Validation {
            field: field.into(),
            fault,
        }
    }
}
