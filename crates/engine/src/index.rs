//! Index rows
//!
//! The store has no secondary indexes, so every entity is written once per
//! access path. Each copy carries the full payload; only the keys differ:
//!
//! | Access path | PartitionKey | RowKey |
//! |-------------|--------------|--------|
//! | primary | `SagaId` | entity id |
//! | unique field `F` | `F` | escaped value of `F` |
//!
//! Save, update and complete all fan out over [`index_keys`]. A unique row
//! written for an earlier value of its field is found again through
//! [`stored_unique_keys`] on the primary row.

use crate::error::Result;
use crate::schema::{SagaData, Schema};
use sagastore_core::key::key_string;
use sagastore_core::{PropertyBag, Value};
use smallvec::SmallVec;
use uuid::Uuid;

/// Partition key of primary index rows
pub const PRIMARY_PARTITION: &str = "SagaId";

/// Key set of one entity; inline for up to three unique fields
pub type IndexKeys = SmallVec<[IndexKey; 4]>;

/// Physical key of one index row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Keyed by entity id
    Primary {
        /// Stringified id
        row_key: String,
    },
    /// Keyed by a unique field's value
    Unique {
        /// Field name, used as partition key
        field: &'static str,
        /// Escaped, stringified field value
        row_key: String,
    },
}

impl IndexKey {
    /// Primary key for an entity id
    pub fn primary(id: Uuid) -> Self {
        IndexKey::Primary {
            row_key: key_string(&Value::Guid(id)),
        }
    }

    /// Key for a unique field holding `value`
    pub fn unique(field: &'static str, value: &Value) -> Self {
        IndexKey::Unique {
            field,
            row_key: key_string(value),
        }
    }

    /// Partition key column
    pub fn partition_key(&self) -> &str {
        match self {
            IndexKey::Primary { .. } => PRIMARY_PARTITION,
            IndexKey::Unique { field, .. } => field,
        }
    }

    /// Row key column
    pub fn row_key(&self) -> &str {
        match self {
            IndexKey::Primary { row_key } | IndexKey::Unique { row_key, .. } => row_key,
        }
    }
}

/// All index keys of `entity`: the primary key first, then one per unique
/// field in declaration order.
pub fn index_keys<E: SagaData>(schema: &Schema<E>, entity: &E) -> Result<IndexKeys> {
    let mut keys = IndexKeys::new();
    keys.push(IndexKey::primary(entity.id()));
    for field in schema.unique_fields() {
        let value = field.value(schema.kind(), entity)?;
        keys.push(IndexKey::unique(field.name(), &value));
    }
    Ok(keys)
}

/// Unique keys recorded in a stored copy of an entity.
///
/// Reads the raw properties so a row written under an older declaration
/// still yields its keys. Fields absent from the row contribute nothing.
pub fn stored_unique_keys<E: SagaData>(schema: &Schema<E>, row: &PropertyBag) -> IndexKeys {
    schema
        .unique_fields()
        .filter_map(|field| {
            row.property(field.name())
                .map(|value| IndexKey::unique(field.name(), value))
        })
        .collect()
}
