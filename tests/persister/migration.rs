//! Table creation and legacy row migration on first access

use crate::common::*;
use sagastore::PersisterBuilder;
use std::sync::Arc;

#[test]
fn first_access_creates_the_table() {
    let persister = Persister::in_memory();
    assert!(!persister.store().table_exists("Order").unwrap());

    assert_eq!(persister.prepare::<Order>().unwrap(), None);
    assert!(persister.store().table_exists("Order").unwrap());
    assert!(persister.table_cache().contains("Order"));
}

#[test]
fn legacy_rows_are_migrated_on_first_access() {
    init_tracing();
    let store = MemoryTableStore::new();
    let old = Order::new("PO-42");
    insert_legacy(&store, &old);

    let persister = Persister::new(store);
    let found: Order = persister.get_by("OrderNumber", "PO-42").unwrap().unwrap();
    assert_eq!(found, old);

    let id = old.id.to_string();
    let store = persister.store();
    assert!(store.retrieve("Order", &id, &id).unwrap().is_none());
    assert!(store.retrieve("Order", "SagaId", &id).unwrap().is_some());
    assert_eq!(store.row_count("Order"), 2);
}

#[test]
fn migration_report_counts_rows() {
    let store = MemoryTableStore::new();
    for i in 0..3 {
        insert_legacy(&store, &Order::new(&format!("PO-{}", i)));
    }
    let current = Order::new("PO-current");
    let persister = Persister::new(store);

    let report = persister.prepare::<Order>().unwrap().unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.migrated, 3);
    assert_eq!(report.skipped, 0);
    assert!(report.scanned >= 3);

    persister.save(&current).unwrap();
    assert_eq!(persister.store().row_count("Order"), 8);
}

#[test]
fn migration_pages_through_large_tables() {
    let store = Arc::new(FaultyStore::new());
    for i in 0..10 {
        insert_legacy(store.inner(), &Order::new(&format!("PO-{}", i)));
    }

    let persister = PersisterBuilder::new()
        .migration_page_size(3)
        .open(Arc::clone(&store))
        .unwrap();
    let report = persister.prepare::<Order>().unwrap().unwrap();

    assert_eq!(report.migrated, 10);
    assert!(report.pages >= 4);
    assert_eq!(store.queries(), report.pages);
    assert_eq!(store.inner().row_count("Order"), 20);
}

#[test]
fn second_access_is_short_circuited_by_the_cache() {
    let store = Arc::new(FaultyStore::new());
    insert_legacy(store.inner(), &Order::new("PO-1"));

    let persister = Persister::new(Arc::clone(&store));
    persister.prepare::<Order>().unwrap();
    let queries = store.queries();

    // A row that only a fresh migration would pick up
    let late = Order::new("PO-late");
    insert_legacy(store.inner(), &late);

    assert_eq!(persister.prepare::<Order>().unwrap(), None);
    assert!(persister.get::<Order>(late.id).unwrap().is_none());
    assert_eq!(store.queries(), queries);
}

#[test]
fn shared_cache_spans_persisters() {
    let cache = Arc::new(TableCache::new());
    let store = Arc::new(MemoryTableStore::new());
    insert_legacy(&*store, &Order::new("PO-1"));

    let first = PersisterBuilder::new()
        .table_cache(Arc::clone(&cache))
        .open(Arc::clone(&store))
        .unwrap();
    assert!(first.prepare::<Order>().unwrap().is_some());

    let late = Order::new("PO-late");
    insert_legacy(&*store, &late);

    let second = PersisterBuilder::new()
        .table_cache(cache)
        .open(Arc::clone(&store))
        .unwrap();
    assert_eq!(second.prepare::<Order>().unwrap(), None);

    // A persister with its own cache migrates again
    let third = Persister::new(Arc::clone(&store));
    let report = third.prepare::<Order>().unwrap().unwrap();
    assert_eq!(report.migrated, 1);
    assert!(third.get::<Order>(late.id).unwrap().is_some());
}

#[test]
fn disabled_auto_update_never_touches_tables() {
    let store = Arc::new(FaultyStore::new());
    let persister = PersisterBuilder::new()
        .auto_update_schema(false)
        .open(Arc::clone(&store))
        .unwrap();

    assert_eq!(persister.prepare::<Order>().unwrap(), None);
    assert!(!store.inner().table_exists("Order").unwrap());
    assert!(persister.get::<Order>(Uuid::new_v4()).unwrap().is_none());

    let err = persister.save(&Order::new("PO-1")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn disabled_auto_update_leaves_legacy_rows() {
    let store = Arc::new(MemoryTableStore::new());
    let old = Order::new("PO-1");
    insert_legacy(&*store, &old);

    let persister = PersisterBuilder::new()
        .auto_update_schema(false)
        .open(Arc::clone(&store))
        .unwrap();
    assert!(persister.get::<Order>(old.id).unwrap().is_none());
    assert_eq!(store.row_count("Order"), 1);
}
