//! Error types for sagastore-core

use thiserror::Error;

/// Errors raised by the core value and key rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A partition or row key the store would reject
    #[error("invalid key '{key}': {reason}")]
    InvalidKey {
        /// The offending key (truncated if very long)
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// A name that cannot be used as a table name
    #[error("invalid table name '{name}': {reason}")]
    InvalidTableName {
        /// The offending name
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
