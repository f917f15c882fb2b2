//! The table store protocol
//!
//! [`TableStore`] is everything the engine needs from a wide-column table
//! service: point reads by `(PartitionKey, RowKey)`, filtered scans in pages,
//! insert-or-replace and delete. There are no transactions across
//! partitions; a batch is applied operation by operation and stops at the
//! first failure.

use crate::scan::Pages;
use sagastore_core::{CoreError, Filter, PropertyBag};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Largest page a single segmented query may request
pub const MAX_PAGE_SIZE: usize = 1000;

/// Errors reported by a table store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The table does not exist
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The addressed row does not exist
    #[error("entity ({partition_key}, {row_key}) not found in {table}")]
    EntityNotFound {
        /// Table name
        table: String,
        /// Partition key of the missing row
        partition_key: String,
        /// Row key of the missing row
        row_key: String,
    },

    /// A key or table name the store rejects
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// A continuation token this store did not issue
    #[error("invalid continuation token")]
    InvalidContinuationToken,

    /// Request rate exceeded; the caller may retry later
    #[error("server busy: {0}")]
    Throttled(String),

    /// Connectivity failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Malformed request
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl StoreError {
    /// True for "table missing" and "row missing"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::TableNotFound(_) | StoreError::EntityNotFound { .. }
        )
    }

    /// True for transient failures an outer retry policy may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Throttled(_) | StoreError::Unavailable(_))
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// One operation of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum TableOperation {
    /// Write the row, replacing any row with the same keys
    InsertOrReplace(PropertyBag),
    /// Remove a row; fails with `EntityNotFound` if it is absent
    Delete {
        /// Partition key of the row
        partition_key: String,
        /// Row key of the row
        row_key: String,
    },
}

impl TableOperation {
    /// Delete operation for a row
    pub fn delete(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        TableOperation::Delete {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }

    /// The `(PartitionKey, RowKey)` this operation addresses
    pub fn keys(&self) -> (&str, &str) {
        match self {
            TableOperation::InsertOrReplace(bag) => (bag.partition_key(), bag.row_key()),
            TableOperation::Delete {
                partition_key,
                row_key,
            } => (partition_key, row_key),
        }
    }
}

/// Opaque position in a paged scan, issued by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wrap a token string previously obtained from [`as_str`](Self::as_str)
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string, e.g. to persist a scan position
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a segmented query
#[derive(Debug, Clone, Default)]
pub struct Segment {
    /// Rows of this page, in key order
    pub rows: Vec<PropertyBag>,
    /// Where the next page starts; `None` on the last page
    pub continuation: Option<ContinuationToken>,
}

/// A wide-column table store.
///
/// Implementations must be safe to share between threads. All calls block
/// until the store has answered.
pub trait TableStore: Send + Sync {
    /// Create the table unless it exists. Returns `true` if it was created.
    fn create_table_if_not_exists(&self, table: &str) -> Result<bool>;

    /// Check whether the table exists
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Drop the table and all its rows. Returns `true` if it existed.
    fn delete_table(&self, table: &str) -> Result<bool>;

    /// Point read.
    ///
    /// Returns `Ok(None)` for a missing row and `Err(TableNotFound)` for a
    /// missing table.
    fn retrieve(&self, table: &str, partition_key: &str, row_key: &str)
        -> Result<Option<PropertyBag>>;

    /// Read one page of rows matching `filter` (all rows if `None`),
    /// starting at `token`, at most `take` rows.
    fn query_segmented(
        &self,
        table: &str,
        filter: Option<&Filter>,
        take: usize,
        token: Option<&ContinuationToken>,
    ) -> Result<Segment>;

    /// Apply operations in order, stopping at the first failure.
    ///
    /// Operations applied before the failure stay applied.
    fn execute_batch(&self, table: &str, operations: Vec<TableOperation>) -> Result<()>;

    /// Delete one row; `Err(EntityNotFound)` if it does not exist
    fn delete(&self, table: &str, partition_key: &str, row_key: &str) -> Result<()> {
        self.execute_batch(table, vec![TableOperation::delete(partition_key, row_key)])
    }

    /// First row matching `filter`, paging through the whole table if needed
    fn query_first(&self, table: &str, filter: &Filter) -> Result<Option<PropertyBag>> {
        for page in Pages::new(self, table, Some(filter.clone()), MAX_PAGE_SIZE) {
            if let Some(row) = page?.into_iter().next() {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}

impl<T: TableStore + ?Sized> TableStore for Arc<T> {
    fn create_table_if_not_exists(&self, table: &str) -> Result<bool> {
        (**self).create_table_if_not_exists(table)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        (**self).table_exists(table)
    }

    fn delete_table(&self, table: &str) -> Result<bool> {
        (**self).delete_table(table)
    }

    fn retrieve(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<PropertyBag>> {
        (**self).retrieve(table, partition_key, row_key)
    }

    fn query_segmented(
        &self,
        table: &str,
        filter: Option<&Filter>,
        take: usize,
        token: Option<&ContinuationToken>,
    ) -> Result<Segment> {
        (**self).query_segmented(table, filter, take, token)
    }

    fn execute_batch(&self, table: &str, operations: Vec<TableOperation>) -> Result<()> {
        (**self).execute_batch(table, operations)
    }

    fn delete(&self, table: &str, partition_key: &str, row_key: &str) -> Result<()> {
        (**self).delete(table, partition_key, row_key)
    }
}
