//! Entity engine for sagastore
//!
//! Persists typed entities in a [`sagastore_storage::TableStore`]:
//! - [`EntityStore`]: get, get-by, save, update and complete
//! - [`converter`]: entity to property bag and back
//! - [`query`]: equality filters over declared properties
//! - [`schema`]: per-type field declarations and the schema registry
//! - [`index`]: primary and unique-field row keys
//! - [`TableCache`] and [`migration`]: table lifecycle on first access

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter;
pub mod error;
pub mod index;
pub mod migration;
pub mod query;
pub mod schema;
pub mod store;
pub mod table_cache;


pub use error::{EngineError, Result};
pub use index::{IndexKey, PRIMARY_PARTITION};
pub use migration::MigrationReport;
pub use schema::{FieldType, SagaData, Schema, SchemaBuilder, SchemaRegistry, ID_FIELD};
pub use store::{EntityStore, StoreOptions};
pub use table_cache::TableCache;
