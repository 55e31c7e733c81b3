//! Core types and the stage machine for custody
//!
//! This crate defines everything that does not touch storage:
//! - Identifiers: [`AccountId`], [`Scope`], [`Field`], [`Key`]
//! - The workflow model: [`Variant`], [`Stage`], [`StateRecord`], [`Command`]
//! - The unified transition validator: [`StageMachine`]
//! - The error taxonomy: [`Error`]
//! - Storage seams: [`Storage`], [`StateStore`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod machine;
pub mod record;
pub mod stage;
pub mod traits;
pub mod types;

pub use command::{Action, Command};
pub use error::{Error, Result};
pub use machine::{transition, StageMachine, TransitionRule};
pub use record::StateRecord;
pub use stage::{AccountStage, GlobalStage, Stage, Variant};
pub use traits::{StateStore, Storage};
pub use types::{AccountId, Field, Key, Scope, Versioned};
