//! Store failures propagate; only not-found is absorbed on lookups

use crate::common::*;
use sagastore::{Error, StoreError};
use std::sync::Arc;

fn persister(store: &Arc<FaultyStore>) -> Persister<Arc<FaultyStore>> {
    let persister = Persister::new(Arc::clone(store));
    persister.prepare::<Order>().unwrap();
    persister
}

#[test]
fn throttled_point_read_propagates() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    store.fail_retrieve(StoreError::Throttled("slow down".into()));

    let err = persister.get::<Order>(Uuid::new_v4()).unwrap_err();
    assert!(err.is_retryable());
    let err = persister.get_by::<Order>("OrderNumber", "PO-1").unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Throttled(_))));
}

#[test]
fn unavailable_scan_propagates() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    store.fail_query(StoreError::Unavailable("connection reset".into()));

    let err = persister.get_by::<Order>("Customer", "acme").unwrap_err();
    assert!(err.is_retryable());
    assert!(!err.is_not_found());
}

#[test]
fn not_found_on_lookup_is_absent() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    store.fail_retrieve(StoreError::TableNotFound("Order".into()));
    store.fail_query(StoreError::TableNotFound("Order".into()));

    assert!(persister.get::<Order>(Uuid::new_v4()).unwrap().is_none());
    assert!(persister.get_by::<Order>("OrderNumber", "PO-1").unwrap().is_none());
    assert!(persister.get_by::<Order>("Customer", "acme").unwrap().is_none());
}

#[test]
fn failed_save_propagates() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    store.fail_batch_after(0, StoreError::BadRequest("payload too large".into()));

    let err = persister.save(&Order::new("PO-1")).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::BadRequest(_))));
    assert_eq!(store.inner().row_count("Order"), 0);
}

#[test]
fn partial_write_is_repaired_by_next_update() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    let order = Order::new("PO-9");

    store.fail_batch_after(1, StoreError::Unavailable("dropped".into()));
    assert!(persister.save(&order).is_err());

    // The primary row landed, the unique row did not
    assert_eq!(persister.get::<Order>(order.id).unwrap(), Some(order.clone()));
    assert!(persister.get_by::<Order>("OrderNumber", "PO-9").unwrap().is_none());

    store.heal();
    persister.update(&order).unwrap();
    assert_eq!(
        persister.get_by::<Order>("OrderNumber", "PO-9").unwrap(),
        Some(order)
    );
}

#[test]
fn failed_complete_propagates() {
    let store = Arc::new(FaultyStore::new());
    let persister = persister(&store);
    let order = Order::new("PO-5");
    persister.save(&order).unwrap();

    store.fail_batch_after(0, StoreError::Unavailable("down".into()));
    assert!(persister.complete(&order).unwrap_err().is_retryable());

    store.heal();
    persister.complete(&order).unwrap();
    assert_eq!(store.inner().row_count("Order"), 0);
}

#[test]
fn failed_migration_is_retried_on_next_access() {
    let store = Arc::new(FaultyStore::new());
    let old = Order::new("PO-1");
    insert_legacy(store.inner(), &old);
    let persister = Persister::new(Arc::clone(&store));

    store.fail_query(StoreError::Unavailable("down".into()));
    assert!(persister.get::<Order>(old.id).is_err());
    assert!(!persister.table_cache().contains("Order"));

    store.heal();
    assert_eq!(persister.get::<Order>(old.id).unwrap(), Some(old));
    assert!(persister.table_cache().contains("Order"));
}
