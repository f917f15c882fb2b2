//! Convenient imports for sagastore.
//!
//! ```ignore
//! use sagastore::prelude::*;
//!
//! let persister = Persister::in_memory();
//! persister.save(&order)?;
//! ```

// Main entry point
pub use crate::persister::{Persister, PersisterBuilder, SagaPersister};

// Configuration
pub use crate::config::PersisterConfig;

// Error handling
pub use crate::error::{Error, Result};

// Entity declaration
pub use sagastore_engine::{SagaData, SchemaBuilder, TableCache};

// Storage
pub use sagastore_storage::{MemoryTableStore, TableStore};

// Core types
pub use sagastore_core::{ScalarKind, Value};
pub use uuid::Uuid;
