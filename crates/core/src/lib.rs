//! Core types for sagastore
//!
//! This crate defines the vocabulary shared by the storage and engine layers:
//! - [`Value`] / [`ScalarKind`]: the eight scalar kinds the table store holds
//! - [`PropertyBag`]: one row, keyed by `(PartitionKey, RowKey)`
//! - [`Filter`]: store-native equality filters
//! - [`key`]: key escaping and validation rules

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bag;
pub mod error;
pub mod filter;
pub mod key;
pub mod value;

pub use bag::{PropertyBag, PARTITION_KEY, ROW_KEY};
pub use error::{CoreError, Result};
pub use filter::Filter;
pub use value::{ScalarKind, Value};
