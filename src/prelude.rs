//! Convenient imports for custody.
//!
//! ```ignore
//! use custody::prelude::*;
//!
//! let custody = Custody::ephemeral(Variant::Global);
//! custody.create("creator")?;
//! ```

// Main entry point
pub use crate::database::{Custody, CustodyBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{AccountId, Command, Scope, Stage, StateRecord, Variant};

// Invocations
pub use crate::types::{Action, Invocation, Operation, Output};
