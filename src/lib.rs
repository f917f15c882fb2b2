//! # sagastore
//!
//! Saga persistence over wide-column table storage.
//!
//! Sagas are typed entities with a UUID id and optionally some unique
//! business keys. Each saga kind gets its own table. A saga is stored once
//! under its id and once more under each unique field, so looking it up by
//! either is a single point read.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sagastore::prelude::*;
//!
//! #[derive(Default)]
//! struct OrderSaga {
//!     id: Uuid,
//!     order_number: String,
//!     total: f64,
//! }
//!
//! impl SagaData for OrderSaga {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//!
//!     fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
//!         schema
//!             .field("Id", |s| &s.id, |s| &mut s.id)
//!             .unique("OrderNumber", |s| &s.order_number, |s| &mut s.order_number)
//!             .field("Total", |s| &s.total, |s| &mut s.total)
//!     }
//! }
//!
//! let persister = Persister::in_memory();
//! persister.save(&order)?;
//! let found: Option<OrderSaga> = persister.get_by("OrderNumber", "PO-42")?;
//! persister.complete(&order)?;
//! ```
//!
//! ## Layers
//!
//! - `sagastore-core` - values, property bags, filters, key escaping
//! - `sagastore-storage` - the [`TableStore`] protocol and an in-memory store
//! - `sagastore-engine` - entity store, converter, query builder, migration
//! - this crate - [`Persister`], configuration and the unified [`Error`]

#![warn(missing_docs)]

mod config;
mod error;
mod persister;

pub mod prelude;

// Re-export main entry points
pub use config::PersisterConfig;
pub use error::{Error, Result};
pub use persister::{Persister, PersisterBuilder, SagaPersister};

// Re-export layers
pub use sagastore_core::{Filter, PropertyBag, ScalarKind, Value};
pub use sagastore_engine::{MigrationReport, SagaData, SchemaBuilder, TableCache};
pub use sagastore_storage::{
    ContinuationToken, MemoryTableStore, Segment, StoreError, TableOperation, TableStore,
};
