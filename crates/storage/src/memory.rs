//! In-memory table store
//!
//! Tables live in a `DashMap` keyed by table name, so different tables never
//! contend. Each table is a `BTreeMap` ordered by `(PartitionKey, RowKey)`
//! behind its own `RwLock`, which gives scans the same key order the table
//! service uses and makes continuation tokens a plain "next key".
//!
//! Key and table-name rules are enforced exactly as the remote service does,
//! so code that passes against this store produces legal rows remotely too.

use crate::table::{
    ContinuationToken, Result, Segment, StoreError, TableOperation, TableStore, MAX_PAGE_SIZE,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use sagastore_core::key::{validate_key, validate_table_name};
use sagastore_core::{Filter, PropertyBag};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;

type RowKey = (String, String);
type Rows = BTreeMap<RowKey, PropertyBag>;

/// Table store kept entirely in process memory
///
/// # Thread Safety
///
/// - Table lookup: sharded via DashMap
/// - Reads: shared lock on one table
/// - Writes: exclusive lock on one table, per operation
pub struct MemoryTableStore {
    tables: DashMap<String, Arc<RwLock<Rows>>>,
}

impl MemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    fn table(&self, name: &str) -> Result<Arc<RwLock<Rows>>> {
        self.tables
            .get(name)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of rows in a table (0 if the table does not exist)
    pub fn row_count(&self, table: &str) -> usize {
        self.table(table).map(|t| t.read().len()).unwrap_or(0)
    }

    /// Snapshot of all rows of a table, in key order
    pub fn rows(&self, table: &str) -> Vec<PropertyBag> {
        self.table(table)
            .map(|t| t.read().values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTableStore")
            .field("table_count", &self.table_count())
            .finish()
    }
}

fn encode_token(key: &RowKey) -> Result<ContinuationToken> {
    let bytes = rmp_serde::to_vec(key).map_err(|e| StoreError::BadRequest(e.to_string()))?;
    Ok(ContinuationToken::new(URL_SAFE_NO_PAD.encode(bytes)))
}

fn decode_token(token: &ContinuationToken) -> Result<RowKey> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.as_str())
        .map_err(|_| StoreError::InvalidContinuationToken)?;
    rmp_serde::from_slice(&bytes).map_err(|_| StoreError::InvalidContinuationToken)
}

fn checked_key(partition_key: &str, row_key: &str) -> Result<RowKey> {
    validate_key(partition_key)?;
    validate_key(row_key)?;
    Ok((partition_key.to_string(), row_key.to_string()))
}

impl TableStore for MemoryTableStore {
    fn create_table_if_not_exists(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        match self.tables.entry(table.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(Rows::new())));
                debug!(table, "created table");
                Ok(true)
            }
        }
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.tables.contains_key(table))
    }

    fn delete_table(&self, table: &str) -> Result<bool> {
        Ok(self.tables.remove(table).is_some())
    }

    fn retrieve(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<PropertyBag>> {
        let key = checked_key(partition_key, row_key)?;
        let rows = self.table(table)?;
        let found = rows.read().get(&key).cloned();
        Ok(found)
    }

    fn query_segmented(
        &self,
        table: &str,
        filter: Option<&Filter>,
        take: usize,
        token: Option<&ContinuationToken>,
    ) -> Result<Segment> {
        if take == 0 || take > MAX_PAGE_SIZE {
            return Err(StoreError::BadRequest(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, take
            )));
        }
        let start = match token {
            Some(token) => Bound::Included(decode_token(token)?),
            None => Bound::Unbounded,
        };
        let table = self.table(table)?;
        let rows = table.read();

        let mut page = Vec::new();
        let mut continuation = None;
        for (key, bag) in rows.range((start, Bound::Unbounded)) {
            if page.len() == take {
                continuation = Some(encode_token(key)?);
                break;
            }
            if filter.map_or(true, |f| f.matches(bag)) {
                page.push(bag.clone());
            }
        }
        Ok(Segment {
            rows: page,
            continuation,
        })
    }

    fn execute_batch(&self, table: &str, operations: Vec<TableOperation>) -> Result<()> {
        let rows = self.table(table)?;
        for op in operations {
            let (partition_key, row_key) = op.keys();
            let key = checked_key(partition_key, row_key)?;
            match op {
                TableOperation::InsertOrReplace(bag) => {
                    rows.write().insert(key, bag);
                }
                TableOperation::Delete { .. } => {
                    if rows.write().remove(&key).is_none() {
                        let (partition_key, row_key) = key;
                        return Err(StoreError::EntityNotFound {
                            table: table.to_string(),
                            partition_key,
                            row_key,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
