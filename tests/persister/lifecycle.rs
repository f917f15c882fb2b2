//! Save, lookup, update and complete through the facade

use crate::common::*;
use proptest::prelude::*;
use sagastore::{Error, ScalarKind};

// ============================================================================
// Save and lookup
// ============================================================================

#[test]
fn order_is_stored_under_id_and_order_number() {
    init_tracing();
    let persister = Persister::in_memory();
    let order = Order::new("PO-42");
    persister.save(&order).unwrap();

    let store = persister.store();
    let id = order.id.to_string();
    let primary = store.retrieve("Order", "SagaId", &id).unwrap().unwrap();
    let unique = store.retrieve("Order", "OrderNumber", "PO-42").unwrap().unwrap();
    assert!(primary.same_payload(&unique));
    assert_eq!(store.row_count("Order"), 2);

    let by_id: Order = persister.get(order.id).unwrap().unwrap();
    let by_number: Order = persister.get_by("OrderNumber", "PO-42").unwrap().unwrap();
    assert_eq!(by_id, order);
    assert_eq!(by_number, by_id);
}

#[test]
fn lookups_of_unknown_sagas_are_none() {
    let persister = Persister::in_memory();
    assert!(persister.get::<Order>(Uuid::new_v4()).unwrap().is_none());
    assert!(persister.get_by::<Order>("OrderNumber", "PO-0").unwrap().is_none());
    assert!(persister.get_by::<Order>("Customer", "nobody").unwrap().is_none());
}

#[test]
fn non_unique_property_is_found_by_scan() {
    let persister = Persister::in_memory();
    let order = Order::new("PO-1");
    persister.save(&order).unwrap();
    persister
        .save(&Order {
            customer: "globex".into(),
            ..Order::new("PO-2")
        })
        .unwrap();

    let found: Order = persister.get_by("Customer", "acme").unwrap().unwrap();
    assert_eq!(found, order);
    let found: Order = persister.get_by("Total", 250.75).unwrap().unwrap();
    assert_eq!(found.customer, "acme");
}

#[test]
fn every_unique_field_gets_its_own_row() {
    let persister = Persister::in_memory();
    let shipment = Shipment::new(9_000_000_001);
    persister.save(&shipment).unwrap();

    assert_eq!(persister.store().row_count("Shipment"), 3);
    let by_tracking: Shipment = persister
        .get_by("Tracking", 9_000_000_001i64)
        .unwrap()
        .unwrap();
    let by_carrier: Shipment = persister
        .get_by("CarrierRef", shipment.carrier_ref)
        .unwrap()
        .unwrap();
    assert_eq!(by_tracking, shipment);
    assert_eq!(by_carrier, shipment);

    let rows = persister.store().rows("Shipment");
    assert!(rows.iter().any(|r| r.partition_key() == "Tracking" && r.row_key() == "9000000001"));
}

#[test]
fn reserved_characters_in_unique_values_are_escaped() {
    let persister = Persister::in_memory();
    let order = Order::new("PO/42#?\\%");
    persister.save(&order).unwrap();

    let found: Order = persister.get_by("OrderNumber", "PO/42#?\\%").unwrap().unwrap();
    assert_eq!(found, order);
    assert!(persister
        .store()
        .retrieve("Order", "OrderNumber", "PO%2F42%23%3F%5C%25")
        .unwrap()
        .is_some());
}

#[test]
fn default_saga_round_trips() {
    let persister = Persister::in_memory();
    let order = Order {
        id: Uuid::new_v4(),
        ..Order::default()
    };
    persister.save(&order).unwrap();
    assert_eq!(persister.get::<Order>(order.id).unwrap(), Some(order.clone()));
    assert_eq!(persister.get_by::<Order>("OrderNumber", "").unwrap(), Some(order));
}

// ============================================================================
// Update and complete
// ============================================================================

#[test]
fn update_rewrites_every_row() {
    let persister = Persister::in_memory();
    let mut order = Order::new("PO-7");
    persister.save(&order).unwrap();

    order.total = 10.0;
    persister.update(&order).unwrap();
    let first = persister.store().rows("Order");
    persister.update(&order).unwrap();
    let second = persister.store().rows("Order");

    assert_eq!(first, second);
    let found: Order = persister.get_by("OrderNumber", "PO-7").unwrap().unwrap();
    assert_eq!(found.total, 10.0);
}

#[test]
fn changing_a_unique_value_moves_its_row() {
    init_tracing();
    let persister = Persister::in_memory();
    let mut order = Order::new("PO-1");
    persister.save(&order).unwrap();

    order.order_number = "PO-2".into();
    persister.update(&order).unwrap();

    assert_eq!(persister.store().row_count("Order"), 2);
    assert!(persister.get_by::<Order>("OrderNumber", "PO-1").unwrap().is_none());
    assert_eq!(
        persister.get_by::<Order>("OrderNumber", "PO-2").unwrap(),
        Some(order.clone())
    );

    persister.complete(&order).unwrap();
    assert_eq!(persister.store().row_count("Order"), 0);
}

#[test]
fn complete_with_unsaved_unique_change_removes_stored_rows() {
    let persister = Persister::in_memory();
    let mut shipment = Shipment::new(7);
    persister.save(&shipment).unwrap();

    shipment.tracking = 8;
    shipment.carrier_ref = Uuid::new_v4();
    persister.complete(&shipment).unwrap();

    assert_eq!(persister.store().row_count("Shipment"), 0);
    assert!(persister.get_by::<Shipment>("Tracking", 7i64).unwrap().is_none());
}

#[test]
fn complete_removes_every_row_and_can_repeat() {
    let persister = Persister::in_memory();
    let shipment = Shipment::new(5);
    persister.save(&shipment).unwrap();

    persister.complete(&shipment).unwrap();
    assert_eq!(persister.store().row_count("Shipment"), 0);
    assert!(persister.get::<Shipment>(shipment.id).unwrap().is_none());
    assert!(persister.get_by::<Shipment>("Tracking", 5i64).unwrap().is_none());

    persister.complete(&shipment).unwrap();
}

#[test]
fn complete_after_partial_removal() {
    let persister = Persister::in_memory();
    let order = Order::new("PO-3");
    persister.save(&order).unwrap();
    persister
        .store()
        .delete("Order", "OrderNumber", "PO-3")
        .unwrap();

    persister.complete(&order).unwrap();
    assert_eq!(persister.store().row_count("Order"), 0);
}

// ============================================================================
// Usage errors
// ============================================================================

#[test]
fn unsupported_field_type_fails_every_operation() {
    let persister = Persister::in_memory();
    let ledger = Ledger {
        id: Uuid::new_v4(),
        entries: vec![1.0],
    };

    let err = persister.save(&ledger).unwrap_err();
    match err {
        Error::UnsupportedType {
            kind,
            field,
            type_name,
        } => {
            assert_eq!(kind, "Ledger");
            assert_eq!(field, "Entries");
            assert!(type_name.contains("Vec<f64>"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(persister.get::<Ledger>(ledger.id).unwrap_err().is_usage_error());
    assert!(persister.register::<Ledger>().is_err());
}

#[test]
fn saga_without_id_field_is_rejected() {
    let persister = Persister::in_memory();
    let voucher = Voucher {
        id: Uuid::new_v4(),
        code: "SPRING".into(),
    };

    let err = persister.save(&voucher).unwrap_err();
    match err {
        Error::InvalidSchema(message) => assert!(message.contains("'Id'")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(persister.get::<Voucher>(voucher.id).unwrap_err().is_usage_error());
    assert!(persister.store().rows("Voucher").is_empty());
}

#[test]
fn lookup_with_value_of_wrong_kind() {
    let persister = Persister::in_memory();
    let err = persister.get_by::<Shipment>("Tracking", 5i32).unwrap_err();
    assert!(matches!(
        err,
        Error::WrongType {
            expected: ScalarKind::Int64,
            actual: ScalarKind::Int32,
            ..
        }
    ));
}

#[test]
fn lookup_of_undeclared_property() {
    let persister = Persister::in_memory();
    let err = persister.get_by::<Order>("Missing", "x").unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { .. }));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_order_number_round_trips(number in "\\PC{0,40}") {
        let persister = Persister::in_memory();
        let order = Order::new(&number);
        persister.save(&order).unwrap();
        let found: Option<Order> = persister.get_by("OrderNumber", number.as_str()).unwrap();
        prop_assert_eq!(found, Some(order));
    }
}
