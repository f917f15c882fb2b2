//! Entity store
//!
//! [`EntityStore`] persists [`SagaData`] entities in a [`TableStore`], one
//! table per entity kind. Each entity is written once per access path (see
//! [`crate::index`]) so lookups by id or by a unique field are point reads.
//!
//! # Example
//!
//! ```ignore
//! let store = EntityStore::new(MemoryTableStore::new());
//!
//! store.save(&saga)?;
//! let by_id: Option<OrderSaga> = store.get(saga.id)?;
//! let by_number: Option<OrderSaga> = store.get_by("OrderNumber", "PO-42")?;
//! store.complete(&saga)?;
//! ```

use crate::converter::{from_bag, to_bag};
use crate::error::Result;
use crate::index::{index_keys, stored_unique_keys, IndexKey, IndexKeys};
use crate::migration::{self, MigrationReport, DEFAULT_PAGE_SIZE};
use crate::query;
use crate::schema::{SagaData, Schema, SchemaRegistry, ID_FIELD};
use crate::table_cache::TableCache;
use sagastore_core::{PropertyBag, Value};
use sagastore_storage::{StoreError, TableOperation, TableStore, MAX_PAGE_SIZE};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Table management options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Create missing tables and migrate legacy rows on first access
    pub auto_update_schema: bool,
    /// Rows requested per page while migrating
    pub migration_page_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            auto_update_schema: true,
            migration_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Typed entity persistence over a table store
pub struct EntityStore<S> {
    tables: S,
    cache: Arc<TableCache>,
    registry: SchemaRegistry,
    options: StoreOptions,
}

impl<S: TableStore> EntityStore<S> {
    /// Store with default options and a private table cache
    pub fn new(tables: S) -> Self {
        Self::with_options(tables, StoreOptions::default(), Arc::new(TableCache::new()))
    }

    /// Store with explicit options and a shared table cache
    ///
    /// The migration page size is clamped to what the store accepts.
    pub fn with_options(tables: S, options: StoreOptions, cache: Arc<TableCache>) -> Self {
        let options = StoreOptions {
            migration_page_size: options.migration_page_size.clamp(1, MAX_PAGE_SIZE),
            ..options
        };
        Self {
            tables,
            cache,
            registry: SchemaRegistry::new(),
            options,
        }
    }

    /// The underlying table store
    pub fn tables(&self) -> &S {
        &self.tables
    }

    /// The table existence cache
    pub fn table_cache(&self) -> &Arc<TableCache> {
        &self.cache
    }

    /// Effective options
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Build and validate the schema of `E` ahead of first use.
    pub fn register<E: SagaData>(&self) -> Result<Arc<Schema<E>>> {
        self.registry.get_or_register::<E>()
    }

    /// Make sure `E`'s table exists, migrating legacy rows if it did.
    ///
    /// Runs at most once per kind per table cache. Returns the migration
    /// report when a migration ran. With schema auto-management off the
    /// table is assumed to exist.
    pub fn ensure_table<E: SagaData>(&self) -> Result<Option<MigrationReport>> {
        let schema = self.register::<E>()?;
        self.ensure_table_for(&schema)
    }

    fn ensure_table_for<E: SagaData>(
        &self,
        schema: &Schema<E>,
    ) -> Result<Option<MigrationReport>> {
        let kind = schema.kind();
        if self.cache.contains(kind) {
            return Ok(None);
        }
        if !self.options.auto_update_schema {
            self.cache.mark(kind);
            return Ok(None);
        }

        if self.tables.create_table_if_not_exists(kind)? {
            debug!("Created table {}", kind);
            self.cache.mark(kind);
            return Ok(None);
        }

        let report = migration::migrate(&self.tables, schema, self.options.migration_page_size)?;
        self.cache.mark(kind);
        Ok(Some(report))
    }

    fn prepare<E: SagaData>(&self) -> Result<Arc<Schema<E>>> {
        let schema = self.register::<E>()?;
        self.ensure_table_for(&schema)?;
        Ok(schema)
    }

    /// Entity with the given id, if any.
    pub fn get<E: SagaData>(&self, id: Uuid) -> Result<Option<E>> {
        let schema = self.prepare::<E>()?;
        self.read(&schema, &IndexKey::primary(id))
    }

    /// Entity whose `property` equals `value`, if any.
    ///
    /// Unique fields are point reads. Other properties are found by scanning
    /// the table; the first matching row wins.
    pub fn get_by<E: SagaData>(
        &self,
        property: &str,
        value: impl Into<Value>,
    ) -> Result<Option<E>> {
        let value = value.into();
        let schema = self.prepare::<E>()?;
        let filter = query::build(&schema, property, &value)?;

        if let Some(field) = schema.field(property).filter(|f| f.is_unique()) {
            return self.read(&schema, &IndexKey::unique(field.name(), &value));
        }

        let row = absent_if_not_found(self.tables.query_first(schema.kind(), &filter))?;
        row.map(|bag| from_bag(&schema, &bag)).transpose()
    }

    /// Write every index row of `entity`.
    pub fn save<E: SagaData>(&self, entity: &E) -> Result<()> {
        let schema = self.prepare::<E>()?;
        write_rows(&self.tables, &schema, entity)?;
        Ok(())
    }

    /// Rewrite every index row of `entity`. Same as [`EntityStore::save`].
    pub fn update<E: SagaData>(&self, entity: &E) -> Result<()> {
        self.save(entity)
    }

    /// Delete every index row of `entity`. Rows already gone are skipped.
    ///
    /// Unique rows still recorded on the stored primary row are deleted too
    /// unless another entity has taken them over. The primary row goes last
    /// so a failed call can be retried.
    pub fn complete<E: SagaData>(&self, entity: &E) -> Result<()> {
        let schema = self.prepare::<E>()?;
        let mut keys = index_keys(&schema, entity)?;
        let stale: IndexKeys = stored_keys(&self.tables, &schema, &keys[0])?
            .into_iter()
            .filter(|key| !keys.contains(key))
            .collect();
        for key in &stale {
            delete_owned_row(&self.tables, schema.kind(), key, entity.id())?;
        }
        keys.rotate_left(1);

        for key in &keys {
            delete_row(&self.tables, schema.kind(), key)?;
        }
        Ok(())
    }

    fn read<E: SagaData>(&self, schema: &Schema<E>, key: &IndexKey) -> Result<Option<E>> {
        let row = absent_if_not_found(self.tables.retrieve(
            schema.kind(),
            key.partition_key(),
            key.row_key(),
        ))?;
        row.map(|bag| from_bag(schema, &bag)).transpose()
    }
}

impl<S> std::fmt::Debug for EntityStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .field("registry", &self.registry)
            .finish()
    }
}

fn absent_if_not_found(
    result: std::result::Result<Option<PropertyBag>, StoreError>,
) -> Result<Option<PropertyBag>> {
    match result {
        Ok(row) => Ok(row),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Unique keys recorded on the stored row at `primary`, if there is one
fn stored_keys<E, S>(tables: &S, schema: &Schema<E>, primary: &IndexKey) -> Result<IndexKeys>
where
    E: SagaData,
    S: TableStore + ?Sized,
{
    let row = absent_if_not_found(tables.retrieve(
        schema.kind(),
        primary.partition_key(),
        primary.row_key(),
    ))?;
    Ok(row
        .map(|row| stored_unique_keys(schema, &row))
        .unwrap_or_default())
}

fn delete_row<S>(tables: &S, table: &str, key: &IndexKey) -> Result<()>
where
    S: TableStore + ?Sized,
{
    match tables.delete(table, key.partition_key(), key.row_key()) {
        Ok(()) => {
            debug!(
                "Deleted {} row ({}, {})",
                table,
                key.partition_key(),
                key.row_key()
            );
            Ok(())
        }
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Delete the row at `key` only while it is still a copy of entity `id`
fn delete_owned_row<S>(tables: &S, table: &str, key: &IndexKey, id: Uuid) -> Result<()>
where
    S: TableStore + ?Sized,
{
    let row = absent_if_not_found(tables.retrieve(table, key.partition_key(), key.row_key()))?;
    match row {
        Some(row) if row.property(ID_FIELD) == Some(&Value::Guid(id)) => {
            delete_row(tables, table, key)
        }
        _ => Ok(()),
    }
}

/// Submit one insert-or-replace per index row of `entity` as a single batch,
/// then delete unique rows left over from earlier values of this entity.
///
/// The batch is best-effort: rows written before a failure stay written.
/// Stale rows are only removed once the batch has succeeded.
pub(crate) fn write_rows<E, S>(tables: &S, schema: &Schema<E>, entity: &E) -> Result<IndexKeys>
where
    E: SagaData,
    S: TableStore + ?Sized,
{
    let keys = index_keys(schema, entity)?;
    let stale: IndexKeys = stored_keys(tables, schema, &keys[0])?
        .into_iter()
        .filter(|key| !keys.contains(key))
        .collect();
    let payload = to_bag(schema, entity, keys[0].partition_key(), keys[0].row_key())?;
    let operations = keys
        .iter()
        .map(|key| {
            TableOperation::InsertOrReplace(payload.rekeyed(key.partition_key(), key.row_key()))
        })
        .collect();

    tables.execute_batch(schema.kind(), operations)?;
    for key in &keys {
        debug!(
            "Wrote {} row ({}, {})",
            schema.kind(),
            key.partition_key(),
            key.row_key()
        );
    }
    for key in &stale {
        delete_owned_row(tables, schema.kind(), key, entity.id())?;
    }
    Ok(keys)
}
