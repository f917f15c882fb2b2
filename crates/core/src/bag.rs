//! Property bags: the loosely typed row representation of the table store
//!
//! A bag is a map from property name to [`Value`] plus the two key columns
//! that together form the physical row identity. The key columns are kept
//! out of the property map so they can never collide with an entity field.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the partition key column.
pub const PARTITION_KEY: &str = "PartitionKey";

/// Name of the row key column.
pub const ROW_KEY: &str = "RowKey";

/// One row of a table: `(PartitionKey, RowKey)` plus typed properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyBag {
    partition_key: String,
    row_key: String,
    properties: BTreeMap<String, Value>,
}

impl PropertyBag {
    /// Create an empty bag for the given row identity
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Partition key of the row
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Row key of the row
    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    /// Returns a copy of this bag's properties under another row identity.
    pub fn rekeyed(&self, partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: self.properties.clone(),
        }
    }

    /// Set a property, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(name.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a property by name
    ///
    /// The key columns are addressable too, as `String` values, so filters
    /// can match on `PartitionKey` and `RowKey` like any other property.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            PARTITION_KEY => Some(Value::String(self.partition_key.clone())),
            ROW_KEY => Some(Value::String(self.row_key.clone())),
            _ => self.properties.get(name).cloned(),
        }
    }

    /// Borrow a non-key property by name
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Iterate over non-key properties in name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of non-key properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if the bag carries no properties besides its keys
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// True when the partition key equals the row key.
    ///
    /// Rows written by the single-row-per-entity layout used the entity id
    /// for both key columns; no row of the current layout looks like that.
    pub fn has_identical_keys(&self) -> bool {
        self.partition_key == self.row_key
    }

    /// True if both bags hold the same properties, ignoring row identity.
    pub fn same_payload(&self, other: &PropertyBag) -> bool {
        self.properties == other.properties
    }
}
