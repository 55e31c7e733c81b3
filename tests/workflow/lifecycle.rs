//! Lifecycle actions: create, registration, teardown, update/delete

use crate::common::*;

#[test]
fn calls_before_create_are_malformed() {
    let custody = Custody::ephemeral(Variant::Global);
    assert!(!custody.is_created().unwrap());
    assert!(custody.item_dropped("a").unwrap_err().is_malformed());
    assert!(custody.opt_in("a").unwrap_err().is_malformed());
}

#[test]
fn create_is_accepted_once() {
    let custody = Custody::ephemeral(Variant::PerAccount);
    custody.create("creator").unwrap();
    assert!(custody.is_created().unwrap());
    assert!(custody.create("creator").unwrap_err().is_malformed());
    assert!(custody.create("someone-else").unwrap_err().is_malformed());
}

#[test]
fn update_and_delete_are_always_denied() {
    for variant in [Variant::Global, Variant::PerAccount] {
        let custody = Custody::ephemeral(variant);
        custody.create("creator").unwrap();
        assert!(custody.update_application("creator").unwrap_err().is_malformed());
        assert!(custody.delete_application("creator").unwrap_err().is_malformed());
    }
}

#[test]
fn unregistered_account_cannot_call() {
    let custody = per_account(&[]);
    assert!(custody.item_in_cart("mallory").unwrap_err().is_malformed());
    assert!(custody.scopes().is_empty());
}

#[test]
fn close_out_keeps_record_for_return() {
    let custody = per_account(&["alice"]);
    custody.item_in_cart("alice").unwrap();
    custody.item_dropped("alice").unwrap();

    custody.close_out("alice").unwrap();
    assert!(!custody.is_registered("alice").unwrap());
    assert!(custody.item_delivered("alice").unwrap_err().is_malformed());

    custody.opt_in("alice").unwrap();
    assert_eq!(custody.record_for("alice").unwrap(), record(3, false));
    custody.item_delivered("alice").unwrap();
}

#[test]
fn clear_state_always_acknowledged() {
    let custody = per_account(&["alice"]);
    custody.clear_state("alice").unwrap();
    custody.clear_state("alice").unwrap();
    custody.clear_state("never-registered").unwrap();
    assert!(!custody.is_registered("alice").unwrap());
}

#[test]
fn global_variant_accepts_opt_in_without_requiring_it() {
    let custody = global();
    custody.opt_in("courier").unwrap();
    custody.item_dropped("anyone").unwrap();
    custody.close_out("courier").unwrap();
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(2, false));
}

#[test]
fn program_lists_every_lifecycle_policy() {
    let program = global().program();
    let actions: Vec<Action> = program.approval.lifecycle.iter().map(|e| e.action).collect();
    for action in [
        Action::Create,
        Action::OptIn,
        Action::CloseOut,
        Action::ClearState,
        Action::UpdateApplication,
        Action::DeleteApplication,
    ] {
        assert!(actions.contains(&action), "{}", action);
    }
}
