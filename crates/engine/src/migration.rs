//! Legacy row migration
//!
//! Earlier layouts stored one row per entity with `PartitionKey == RowKey`.
//! When a table that already exists is first touched, every such row is
//! decoded, written again through the normal save path and then deleted.
//!
//! The scan pulls one page at a time through [`Pages`]; rows written during
//! the scan are never legacy rows, so they are passed over if the scan
//! reaches them.

use crate::converter::from_bag;
use crate::error::{EngineError, Result};
use crate::schema::{SagaData, Schema};
use crate::store::write_rows;
use sagastore_storage::{Pages, TableStore};
use tracing::{debug, info, warn};

/// Default number of rows requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Counts collected during one migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Pages requested from the store
    pub pages: usize,
    /// Rows inspected
    pub scanned: usize,
    /// Legacy rows rewritten and deleted
    pub migrated: usize,
    /// Legacy rows that could not be decoded and were left in place
    pub skipped: usize,
}

impl MigrationReport {
    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "migration complete: {} pages, {} rows scanned, {} migrated, {} skipped",
            self.pages, self.scanned, self.migrated, self.skipped
        )
    }
}

/// Migrate every legacy row of `E`'s table.
///
/// Store failures abort the run and propagate. A legacy row whose
/// properties do not decode as `E` is logged and left in place.
pub fn migrate<E, S>(tables: &S, schema: &Schema<E>, page_size: usize) -> Result<MigrationReport>
where
    E: SagaData,
    S: TableStore + ?Sized,
{
    let table = schema.kind();
    info!("Starting migration of table {}", table);

    let mut report = MigrationReport::default();
    for page in Pages::new(tables, table, None, page_size) {
        let rows = page?;
        report.pages += 1;
        report.scanned += rows.len();

        for row in rows.iter().filter(|row| row.has_identical_keys()) {
            let entity: E = match from_bag(schema, row) {
                Ok(entity) => entity,
                Err(e @ EngineError::WrongType { .. }) => {
                    warn!(
                        "Skipping legacy row {} in {}: {}",
                        row.row_key(),
                        table,
                        e
                    );
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let written = write_rows(tables, schema, &entity)?;
            let rewritten_in_place = written
                .iter()
                .any(|k| k.partition_key() == row.partition_key() && k.row_key() == row.row_key());
            if !rewritten_in_place {
                match tables.delete(table, row.partition_key(), row.row_key()) {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e.into()),
                }
                debug!("Deleted legacy row {} from {}", row.row_key(), table);
            }
            report.migrated += 1;
        }
    }

    info!("{} in table {}", report.summary(), table);
    Ok(report)
}
