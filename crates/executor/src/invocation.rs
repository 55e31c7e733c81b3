//! Invocations: the unit a client submits
//!
//! An invocation carries its sender and the operations it bundles. Only
//! single-operation invocations are valid; the structure still allows more
//! so that batched submissions can be represented and rejected.

use custody_core::{AccountId, Action, Error, Result};
use serde::{Deserialize, Serialize};

/// One logical operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// What the operation asks for
    pub action: Action,
    /// Positional arguments; `args[0]` names the command of a `Call`
    pub args: Vec<String>,
}

impl Operation {
    /// A workflow call naming `command`
    pub fn call(command: impl Into<String>) -> Self {
        Operation {
            action: Action::Call,
            args: vec![command.into()],
        }
    }

    /// A lifecycle action with no arguments
    pub fn lifecycle(action: Action) -> Self {
        Operation {
            action,
            args: Vec::new(),
        }
    }

    /// The command argument of a call, if present
    pub fn command_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// A client submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Submitting account
    pub sender: AccountId,
    /// Bundled operations
    pub operations: Vec<Operation>,
}

impl Invocation {
    /// An invocation bundling `operations`
    pub fn new(sender: impl Into<AccountId>, operations: Vec<Operation>) -> Self {
        Invocation {
            sender: sender.into(),
            operations,
        }
    }

    /// A single-operation invocation
    pub fn single(sender: impl Into<AccountId>, operation: Operation) -> Self {
        Self::new(sender, vec![operation])
    }

    /// A single workflow call
    pub fn call(sender: impl Into<AccountId>, command: impl Into<String>) -> Self {
        Self::single(sender, Operation::call(command))
    }

    /// A single lifecycle action
    pub fn lifecycle(sender: impl Into<AccountId>, action: Action) -> Self {
        Self::single(sender, Operation::lifecycle(action))
    }

    /// The invocation's only operation
    ///
    /// # Errors
    ///
    /// `MalformedInvocation` unless exactly one operation is present.
    pub fn operation(&self) -> Result<&Operation> {
        match self.operations.as_slice() {
            [op] => Ok(op),
            [] => Err(Error::malformed("invocation contains no operation")),
            ops => Err(Error::malformed(format!(
                "invocation bundles {} operations, exactly one is allowed",
                ops.len()
            ))),
        }
    }
}
