//! Public types for the custody API.
//!
//! Re-exported from the internal crates with a clean public interface.

// Workflow model
pub use custody_core::{AccountId, Action, Command, Scope, Stage, StateRecord, Variant};
pub use custody_core::{AccountStage, GlobalStage, TransitionRule};

// Invocations
pub use custody_executor::{Invocation, Operation, Output, Policy, Program};

// Configuration
pub use custody_engine::{Config, DurabilityMode};
