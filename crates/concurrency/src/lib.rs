//! Concurrency layer for custody
//!
//! This crate implements optimistic concurrency control (OCC) with:
//! - TransactionContext: read/write set tracking, record-level `StateStore`
//! - TransactionManager: validated, all-or-nothing commit
//!
//! Every invocation runs inside exactly one transaction. A transaction that
//! fails validation, or whose body returns an error, applies nothing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;

pub use manager::TransactionManager;
pub use transaction::{TransactionContext, TransactionStatus};
