//! Invocation dispatch for custody
//!
//! The [`Executor`] is the only way state changes. It takes an
//! [`Invocation`], runs it as one transaction against the
//! [`Database`](custody_engine::Database), and returns an [`Output`] or an
//! error with nothing written.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use custody_core::{Action, Variant};
//! use custody_engine::Database;
//! use custody_executor::{Executor, Invocation};
//!
//! let exec = Executor::new(Arc::new(Database::ephemeral(Variant::Global)));
//! exec.execute(&Invocation::lifecycle("creator", Action::Create))?;
//! exec.execute(&Invocation::call("courier", "ItemDropped"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod executor;
mod gate;
mod invocation;
mod output;
pub mod program;

pub use executor::Executor;
pub use gate::{LifecycleGate, Policy};
pub use invocation::{Invocation, Operation};
pub use output::Output;
pub use program::Program;
