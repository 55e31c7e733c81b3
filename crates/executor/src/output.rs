//! Results of accepted invocations

use custody_core::{Action, Command, Scope, StateRecord};
use serde::Serialize;

/// What an accepted invocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    /// A lifecycle action was accepted
    Accepted {
        /// The accepted action
        action: Action,
    },
    /// A workflow command was applied
    Transitioned {
        /// Scope whose record changed
        scope: Scope,
        /// Applied command
        command: Command,
        /// Record before the command
        previous: StateRecord,
        /// Record after the command
        record: StateRecord,
    },
}

impl Output {
    /// The resulting record, for workflow outputs
    pub fn record(&self) -> Option<&StateRecord> {
        match self {
            Output::Accepted { .. } => None,
            Output::Transitioned { record, .. } => Some(record),
        }
    }
}
