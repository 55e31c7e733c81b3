//! Shared helpers for workflow tests

pub use custody::prelude::*;
pub use custody::{Config, DurabilityMode, Program};

/// Global-variant instance, already created
pub fn global() -> Custody {
    let custody = Custody::ephemeral(Variant::Global);
    custody.create("creator").unwrap();
    custody
}

/// Per-account instance, already created, with `accounts` opted in
pub fn per_account(accounts: &[&str]) -> Custody {
    let custody = Custody::ephemeral(Variant::PerAccount);
    custody.create("creator").unwrap();
    for account in accounts {
        custody.opt_in(account).unwrap();
    }
    custody
}

/// Shorthand for a record
pub fn record(stage: u64, payment_released: bool) -> StateRecord {
    StateRecord::new(Stage::new(stage), payment_released)
}
