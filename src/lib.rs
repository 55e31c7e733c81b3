//! # Custody
//!
//! Escrow-style custody workflow: a record moves through a fixed sequence of
//! stages, one validated command at a time, and payment is released only
//! when the last stage is reached.
//!
//! ## Quick Start
//!
//! ```ignore
//! use custody::prelude::*;
//!
//! let custody = Custody::builder()
//!     .variant(Variant::PerAccount)
//!     .path("./state.snap")
//!     .open()?;
//!
//! custody.create("creator")?;
//! custody.opt_in("alice")?;
//! custody.item_in_cart("alice")?;
//! ```
//!
//! ## Variants
//!
//! - [`Variant::Global`]: one shared record, stages 1-4
//! - [`Variant::PerAccount`]: one record per registered account, stages 1-5
//!
//! Out-of-order commands fail with [`Error::InvalidTransition`]; bundled,
//! unknown or forbidden invocations fail with
//! [`Error::MalformedInvocation`]. Neither changes any state.

#![warn(missing_docs)]

mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{Custody, CustodyBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;
