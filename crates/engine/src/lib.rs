//! Database engine for custody
//!
//! Ties together committed storage, the transaction manager and snapshot
//! durability behind a single [`Database`] handle, configured through
//! [`Config`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod durability;

pub use config::Config;
pub use database::Database;
pub use durability::DurabilityMode;
