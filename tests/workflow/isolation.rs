//! Scope isolation under the per-account variant

use std::collections::BTreeMap;

use crate::common::*;
use proptest::prelude::*;

const ACCOUNTS: [&str; 3] = ["alice", "bob", "carol"];

#[test]
fn accounts_progress_independently() {
    let custody = per_account(&["alice", "bob"]);
    custody.item_in_cart("alice").unwrap();
    custody.item_dropped("alice").unwrap();

    assert_eq!(custody.record_for("alice").unwrap(), record(3, false));
    assert_eq!(custody.record_for("bob").unwrap(), record(1, false));

    assert!(custody.item_dropped("bob").unwrap_err().is_invalid_transition());
    assert_eq!(custody.record_for("alice").unwrap(), record(3, false));
}

#[test]
fn reset_only_affects_sender() {
    let custody = per_account(&["alice", "bob"]);
    custody.item_in_cart("alice").unwrap();
    custody.item_in_cart("bob").unwrap();

    custody.reset("alice").unwrap();
    assert_eq!(custody.record_for("alice").unwrap(), record(1, false));
    assert_eq!(custody.record_for("bob").unwrap(), record(2, false));
}

#[test]
fn global_variant_shares_one_record() {
    let custody = global();
    custody.item_dropped("alice").unwrap();
    custody.item_delivered("bob").unwrap();
    assert_eq!(custody.record_for("carol").unwrap(), record(3, false));
    assert_eq!(custody.scopes(), vec![Scope::Global]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever one account submits, every other account's record is
    /// exactly what its own commands produced.
    #[test]
    fn records_match_per_account_model(
        steps in prop::collection::vec((0usize..ACCOUNTS.len(), 0usize..Command::ALL.len()), 0..40)
    ) {
        let custody = per_account(&ACCOUNTS);
        let mut model: BTreeMap<&str, StateRecord> =
            ACCOUNTS.iter().map(|a| (*a, StateRecord::default())).collect();

        for (account_idx, command_idx) in steps {
            let account = ACCOUNTS[account_idx];
            let command = Command::ALL[command_idx];
            let current = model[account];

            match custody_core::transition(Variant::PerAccount, &current, command) {
                Ok(next) => {
                    prop_assert_eq!(custody.call(account, command).unwrap(), next);
                    model.insert(account, next);
                }
                Err(_) => {
                    prop_assert!(custody.call(account, command).unwrap_err().is_rejection());
                }
            }

            for other in ACCOUNTS {
                prop_assert_eq!(custody.record_for(other).unwrap(), model[other]);
            }
        }
    }
}
