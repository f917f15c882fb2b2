//! Unified error types for sagastore.
//!
//! Engine and storage errors are folded into one [`Error`] so callers of the
//! persister handle a single type.

use sagastore_core::ScalarKind;
use sagastore_engine::EngineError;
use sagastore_storage::StoreError;
use thiserror::Error;

/// All sagastore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared field whose type has no table-storage encoding
    #[error("the type '{type_name}' of {kind}.{field} cannot be stored in table storage")]
    UnsupportedType {
        /// Entity kind
        kind: String,
        /// Field name
        field: String,
        /// Rust type name of the field
        type_name: String,
    },

    /// A value of a different kind than the field declares
    #[error("wrong type for {kind}.{field}: expected {expected}, got {actual}")]
    WrongType {
        /// Entity kind
        kind: String,
        /// Field name
        field: String,
        /// Declared kind
        expected: ScalarKind,
        /// Supplied kind
        actual: ScalarKind,
    },

    /// Lookup by a property the entity does not declare
    #[error("{kind} has no property '{property}'")]
    UnknownProperty {
        /// Entity kind
        kind: String,
        /// Requested property
        property: String,
    },

    /// Entity declaration that cannot be stored (bad kind name, duplicate
    /// or reserved field, no `Id` field)
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Failure reported by the table store
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be parsed or is out of range
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sagastore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Throttled and unavailable stores may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_retryable())
    }

    /// Check if the store reported a missing table or row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_not_found())
    }

    /// Check if this error is a programming error in an entity declaration
    /// or lookup rather than a runtime failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedType { .. }
                | Error::WrongType { .. }
                | Error::UnknownProperty { .. }
                | Error::InvalidSchema(_)
        )
    }
}

// Convert from engine errors
impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnsupportedType {
                kind,
                field,
                type_name,
            } => Error::UnsupportedType {
                kind,
                field,
                type_name,
            },
            EngineError::WrongType {
                kind,
                field,
                expected,
                actual,
            } => Error::WrongType {
                kind,
                field,
                expected,
                actual,
            },
            EngineError::UnknownProperty { kind, property } => {
                Error::UnknownProperty { kind, property }
            }
            e @ (EngineError::DuplicateField { .. }
            | EngineError::ReservedField { .. }
            | EngineError::MissingId { .. }
            | EngineError::InvalidKind(_)) => Error::InvalidSchema(e.to_string()),
            EngineError::Store(e) => Error::Store(e),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
