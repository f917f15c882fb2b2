//! Persister configuration.
//!
//! ```toml
//! auto_update_schema = true
//! migration_page_size = 100
//! ```
//!
//! Every key is optional; missing keys take their default.

use crate::error::{Error, Result};
use sagastore_engine::migration::DEFAULT_PAGE_SIZE;
use sagastore_engine::StoreOptions;
use sagastore_storage::MAX_PAGE_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings for a [`crate::Persister`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersisterConfig {
    /// Create missing tables and migrate legacy rows on first access
    pub auto_update_schema: bool,
    /// Rows requested per page while migrating, `1..=1000`
    pub migration_page_size: usize,
}

impl Default for PersisterConfig {
    fn default() -> Self {
        Self {
            auto_update_schema: true,
            migration_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PersisterConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PersisterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.migration_page_size) {
            return Err(Error::Config(format!(
                "migration_page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.migration_page_size
            )));
        }
        Ok(())
    }

    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            auto_update_schema: self.auto_update_schema,
            migration_page_size: self.migration_page_size,
        }
    }
}
