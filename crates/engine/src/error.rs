//! Error types for the entity engine

use sagastore_core::{CoreError, ScalarKind};
use sagastore_storage::StoreError;
use thiserror::Error;

/// Errors raised by the entity store, converter and query builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A declared field whose Rust type has no scalar encoding
    #[error("the type '{type_name}' of {kind}.{field} cannot be stored in table storage")]
    UnsupportedType {
        /// Entity kind
        kind: String,
        /// Field name
        field: String,
        /// Rust type name of the field
        type_name: String,
    },

    /// A value whose kind differs from the field's declared kind
    #[error("wrong type for {kind}.{field}: expected {expected}, got {actual}")]
    WrongType {
        /// Entity kind
        kind: String,
        /// Field name
        field: String,
        /// Declared kind
        expected: ScalarKind,
        /// Kind that was supplied
        actual: ScalarKind,
    },

    /// A property the entity does not declare
    #[error("{kind} has no property '{property}'")]
    UnknownProperty {
        /// Entity kind
        kind: String,
        /// Requested property
        property: String,
    },

    /// Two fields declared with the same property name
    #[error("{kind} declares field '{field}' more than once")]
    DuplicateField {
        /// Entity kind
        kind: String,
        /// Repeated name
        field: String,
    },

    /// A field name that collides with a key column or the primary partition
    #[error("{kind} cannot declare field '{field}': the name is reserved")]
    ReservedField {
        /// Entity kind
        kind: String,
        /// Reserved name
        field: String,
    },

    /// No `Guid` field named `Id`, so loaded entities could not get their id
    #[error("{kind} must declare its id as a Guid field named 'Id'")]
    MissingId {
        /// Entity kind
        kind: String,
    },

    /// The kind name cannot be used as a table name
    #[error("invalid entity kind: {0}")]
    InvalidKind(CoreError),

    /// Failure reported by the table store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// True if the store reported a missing table or row
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_not_found())
    }

    /// True for transient store failures
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_retryable())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
