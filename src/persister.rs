//! Saga persister entry point.
//!
//! This module provides the [`SagaPersister`] contract and [`Persister`],
//! its implementation over any [`TableStore`].

use crate::config::PersisterConfig;
use crate::error::Result;
use sagastore_core::Value;
use sagastore_engine::{EntityStore, MigrationReport, SagaData, TableCache};
use sagastore_storage::{MemoryTableStore, TableStore};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Storage operations a saga runtime needs.
///
/// Unique fields are declared in the entity's schema with
/// [`sagastore_engine::SchemaBuilder::unique`]; [`SagaPersister::get_by`] on
/// one of them is a point read.
pub trait SagaPersister {
    /// Saga with the given id, if any
    fn get<T: SagaData>(&self, id: Uuid) -> Result<Option<T>>;

    /// Saga whose `property` equals `value`, if any
    fn get_by<T: SagaData>(&self, property: &str, value: impl Into<Value>) -> Result<Option<T>>;

    /// Persist a new saga
    fn save<T: SagaData>(&self, saga: &T) -> Result<()>;

    /// Persist a changed saga
    fn update<T: SagaData>(&self, saga: &T) -> Result<()>;

    /// Remove a finished saga
    fn complete<T: SagaData>(&self, saga: &T) -> Result<()>;
}

/// Saga persister over a table store.
///
/// Create one with [`Persister::new`], [`Persister::in_memory`] or
/// [`PersisterBuilder`].
///
/// # Example
///
/// ```ignore
/// use sagastore::prelude::*;
///
/// let persister = Persister::in_memory();
///
/// persister.save(&order)?;
/// let found: Option<OrderSaga> = persister.get_by("OrderNumber", "PO-42")?;
/// persister.complete(&order)?;
/// ```
pub struct Persister<S> {
    inner: EntityStore<S>,
}

impl<S: TableStore> Persister<S> {
    /// Persister with default settings and a private table cache.
    pub fn new(store: S) -> Self {
        Self {
            inner: EntityStore::new(store),
        }
    }

    /// Validate `T`'s declaration ahead of first use.
    pub fn register<T: SagaData>(&self) -> Result<()> {
        self.inner.register::<T>()?;
        Ok(())
    }

    /// Create `T`'s table, or migrate it if it already exists.
    ///
    /// Every operation does this on first use; calling it up front moves
    /// the cost out of the first request. Returns the migration report if a
    /// migration ran.
    pub fn prepare<T: SagaData>(&self) -> Result<Option<MigrationReport>> {
        Ok(self.inner.ensure_table::<T>()?)
    }

    /// The underlying table store.
    pub fn store(&self) -> &S {
        self.inner.tables()
    }

    /// The table existence cache.
    pub fn table_cache(&self) -> &Arc<TableCache> {
        self.inner.table_cache()
    }
}

impl Persister<MemoryTableStore> {
    /// Persister over a fresh in-memory store.
    ///
    /// All data is lost when the persister is dropped.
    pub fn in_memory() -> Self {
        Self::new(MemoryTableStore::new())
    }
}

impl<S: TableStore> SagaPersister for Persister<S> {
    fn get<T: SagaData>(&self, id: Uuid) -> Result<Option<T>> {
        self.inner.get(id).map_err(Into::into)
    }

    fn get_by<T: SagaData>(&self, property: &str, value: impl Into<Value>) -> Result<Option<T>> {
        self.inner.get_by(property, value).map_err(Into::into)
    }

    fn save<T: SagaData>(&self, saga: &T) -> Result<()> {
        self.inner.save(saga).map_err(Into::into)
    }

    fn update<T: SagaData>(&self, saga: &T) -> Result<()> {
        self.inner.update(saga).map_err(Into::into)
    }

    fn complete<T: SagaData>(&self, saga: &T) -> Result<()> {
        self.inner.complete(saga).map_err(Into::into)
    }
}

impl<S> std::fmt::Debug for Persister<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("inner", &self.inner)
            .finish()
    }
}

/// Builder for [`Persister`].
///
/// # Example
///
/// ```ignore
/// let persister = PersisterBuilder::new()
///     .migration_page_size(50)
///     .table_cache(shared_cache.clone())
///     .open(store)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PersisterBuilder {
    config: PersisterConfig,
    cache: Option<Arc<TableCache>>,
}

impl PersisterBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all settings with `config`.
    pub fn config(mut self, config: PersisterConfig) -> Self {
        self.config = config;
        self
    }

    /// Create missing tables and migrate legacy rows on first access
    /// (default `true`).
    ///
    /// When off, tables are assumed to exist and are never touched.
    pub fn auto_update_schema(mut self, enabled: bool) -> Self {
        self.config.auto_update_schema = enabled;
        self
    }

    /// Rows requested per page while migrating (default 100).
    pub fn migration_page_size(mut self, rows: usize) -> Self {
        self.config.migration_page_size = rows;
        self
    }

    /// Share a table existence cache with other persisters.
    pub fn table_cache(mut self, cache: Arc<TableCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the persister over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the settings are out of range.
    pub fn open<S: TableStore>(self, store: S) -> Result<Persister<S>> {
        self.config.validate()?;
        debug!(
            "Opening persister (auto_update_schema={}, migration_page_size={})",
            self.config.auto_update_schema, self.config.migration_page_size
        );
        let cache = self.cache.unwrap_or_default();
        Ok(Persister {
            inner: EntityStore::with_options(store, self.config.store_options(), cache),
        })
    }
}
