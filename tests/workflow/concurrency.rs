//! Concurrent submitters are applied one at a time

use std::sync::Arc;
use std::thread;

use crate::common::*;
use parking_lot::Mutex;

#[test]
fn only_one_concurrent_drop_succeeds() {
    let custody = Arc::new(global());
    let outcomes = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let custody = Arc::clone(&custody);
            let outcomes = Arc::clone(&outcomes);
            thread::spawn(move || {
                let result = custody.item_dropped(&format!("courier-{}", i));
                outcomes.lock().push(result);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let outcomes = outcomes.lock();
    let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.is_invalid_transition()));
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(2, false));
}

#[test]
fn concurrent_accounts_each_complete() {
    let accounts: Vec<String> = (0..6).map(|i| format!("account-{}", i)).collect();
    let names: Vec<&str> = accounts.iter().map(String::as_str).collect();
    let custody = Arc::new(per_account(&names));

    let handles: Vec<_> = accounts
        .iter()
        .cloned()
        .map(|account| {
            let custody = Arc::clone(&custody);
            thread::spawn(move || {
                custody.item_in_cart(&account).unwrap();
                custody.item_dropped(&account).unwrap();
                custody.item_delivered(&account).unwrap();
                custody.item_received(&account).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), record(5, true));
    }
    assert_eq!(custody.scopes().len(), accounts.len());
}
