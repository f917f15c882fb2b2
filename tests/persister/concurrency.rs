//! Concurrent use of one persister and of persisters sharing a store

use crate::common::*;
use sagastore::PersisterBuilder;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_sagas_do_not_interfere() {
    let persister = Arc::new(Persister::in_memory());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let persister = Arc::clone(&persister);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut order = Order::new(&format!("PO-{}", i));
                barrier.wait();
                persister.save(&order).unwrap();
                order.total = i as f64;
                persister.update(&order).unwrap();
                order
            })
        })
        .collect();

    for handle in handles {
        let order = handle.join().unwrap();
        let found: Order = persister
            .get_by("OrderNumber", order.order_number.as_str())
            .unwrap()
            .unwrap();
        assert_eq!(found, order);
    }
    assert_eq!(persister.store().row_count("Order"), 16);
}

#[test]
fn racing_first_accesses_migrate_safely() {
    let store = Arc::new(MemoryTableStore::new());
    let legacy: Vec<Order> = (0..20).map(|i| Order::new(&format!("PO-{}", i))).collect();
    for order in &legacy {
        insert_legacy(&*store, order);
    }

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Separate caches so every thread runs its own migration
                let persister = PersisterBuilder::new()
                    .migration_page_size(5)
                    .open(store)
                    .unwrap();
                barrier.wait();
                persister.prepare::<Order>().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.row_count("Order"), 40);
    assert!(store.rows("Order").iter().all(|r| !r.has_identical_keys()));
    let persister = Persister::new(Arc::clone(&store));
    for order in &legacy {
        assert_eq!(persister.get::<Order>(order.id).unwrap().as_ref(), Some(order));
    }
}

#[test]
fn concurrent_complete_of_the_same_saga() {
    let persister = Arc::new(Persister::in_memory());
    let order = Order::new("PO-1");
    persister.save(&order).unwrap();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let persister = Arc::clone(&persister);
            let barrier = Arc::clone(&barrier);
            let order = order.clone();
            thread::spawn(move || {
                barrier.wait();
                persister.complete(&order)
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(persister.store().row_count("Order"), 0);
}
