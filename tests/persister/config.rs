//! Configuration files and builder settings

use crate::common::*;
use sagastore::{Error, PersisterBuilder};
use std::io::Write;
use std::sync::Arc;

#[test]
fn config_file_drives_the_persister() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "auto_update_schema = false").unwrap();
    writeln!(file, "migration_page_size = 25").unwrap();

    let config = PersisterConfig::from_file(file.path()).unwrap();
    assert!(!config.auto_update_schema);
    assert_eq!(config.migration_page_size, 25);

    let store = Arc::new(MemoryTableStore::new());
    let persister = PersisterBuilder::new()
        .config(config)
        .open(Arc::clone(&store))
        .unwrap();
    persister.prepare::<Order>().unwrap();
    assert!(!store.table_exists("Order").unwrap());
}

#[test]
fn config_file_in_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sagastore.toml");
    std::fs::write(&path, "migration_page_size = 7\n").unwrap();

    let config = PersisterConfig::from_file(&path).unwrap();
    assert!(config.auto_update_schema);
    assert_eq!(config.migration_page_size, 7);
}

#[test]
fn malformed_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "migration_page_size = \"lots\"").unwrap();
    assert!(matches!(
        PersisterConfig::from_file(file.path()),
        Err(Error::Config(_))
    ));
}

#[test]
fn builder_rejects_out_of_range_page_size() {
    let err = PersisterBuilder::new()
        .migration_page_size(5000)
        .open(MemoryTableStore::new())
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
