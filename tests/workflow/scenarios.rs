//! Concrete workflow scenarios

use crate::common::*;

#[test]
fn repeated_drop_is_rejected_and_record_kept() {
    let custody = global();
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(1, false));

    assert_eq!(custody.item_dropped("courier").unwrap(), record(2, false));

    let err = custody.item_dropped("courier").unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(2, false));
}

#[test]
fn receipt_from_stage_three_releases_payment() {
    let custody = global();
    custody.item_dropped("courier").unwrap();
    custody.item_delivered("courier").unwrap();
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(3, false));

    assert_eq!(custody.item_received("buyer").unwrap(), record(4, true));
}

#[test]
fn per_account_full_sequence_reaches_terminal() {
    let custody = per_account(&["alice"]);
    assert_eq!(custody.record_for("alice").unwrap(), record(1, false));

    custody.item_in_cart("alice").unwrap();
    custody.item_dropped("alice").unwrap();
    custody.item_delivered("alice").unwrap();
    let last = custody.item_received("alice").unwrap();

    assert_eq!(last, record(5, true));
    assert_eq!(last.stage, Variant::PerAccount.terminal_stage());
}

#[test]
fn per_account_skipping_a_stage_is_rejected() {
    let custody = per_account(&["alice"]);
    custody.item_in_cart("alice").unwrap();

    let err = custody.item_delivered("alice").unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(custody.record_for("alice").unwrap(), record(2, false));

    let err = custody.item_received("alice").unwrap_err();
    assert!(err.is_invalid_transition());
}

#[test]
fn bundled_invocation_touches_nothing() {
    let custody = global();
    let invocation = Invocation::new(
        "courier",
        vec![Operation::call("ItemDropped"), Operation::call("ItemDelivered")],
    );

    let err = custody.execute(&invocation).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(1, false));
}

#[test]
fn reset_from_terminal() {
    let custody = global();
    custody.item_dropped("a").unwrap();
    custody.item_delivered("a").unwrap();
    custody.item_received("a").unwrap();
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(4, true));

    assert_eq!(custody.reset("a").unwrap(), record(1, false));
}

#[test]
fn workflow_can_run_again_after_reset() {
    let custody = global();
    for _ in 0..2 {
        custody.item_dropped("a").unwrap();
        custody.item_delivered("a").unwrap();
        assert!(custody.item_received("a").unwrap().payment_released);
        custody.reset("a").unwrap();
    }
}

#[test]
fn in_cart_is_unknown_to_global_variant() {
    let custody = global();
    assert!(custody.item_in_cart("a").unwrap_err().is_malformed());
}

#[test]
fn command_names_are_exact() {
    let custody = global();
    for name in ["itemdropped", "ITEMDROPPED", " ItemDropped", "Item Dropped", ""] {
        let err = custody
            .execute(&Invocation::call("a", name))
            .unwrap_err();
        assert!(err.is_malformed(), "{:?}", name);
    }
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(1, false));
}
