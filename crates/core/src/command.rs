//! Workflow commands and invocation actions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A workflow command, the first argument of a normal invocation
///
/// Which commands are legal depends on the variant's transition table;
/// `Reset` is legal everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Command {
    /// Leave the in-cart stage (per-account only)
    ItemInCart,
    /// Item was dropped off
    ItemDropped,
    /// Item was delivered
    ItemDelivered,
    /// Item was received; releases payment from the last stage before terminal
    ItemReceived,
    /// Return the record to its initial values
    Reset,
}

impl Command {
    /// Every command name, in workflow order
    pub const ALL: [Command; 5] = [
        Command::ItemInCart,
        Command::ItemDropped,
        Command::ItemDelivered,
        Command::ItemReceived,
        Command::Reset,
    ];

    /// The wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::ItemInCart => "ItemInCart",
            Command::ItemDropped => "ItemDropped",
            Command::ItemDelivered => "ItemDelivered",
            Command::ItemReceived => "ItemReceived",
            Command::Reset => "Reset",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = Error;

    /// Names are matched exactly; there is no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::malformed(format!("unrecognized command '{}'", s)))
    }
}

/// What an operation asks of the application
///
/// `Call` carries a workflow command in its arguments; every other action is
/// a lifecycle action handled by the lifecycle gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// First-ever deployment of the application
    Create,
    /// Normal workflow operation
    Call,
    /// Account registration
    OptIn,
    /// Account deregistration
    CloseOut,
    /// Forced deregistration; always acknowledged
    ClearState,
    /// Request to replace the application logic
    UpdateApplication,
    /// Request to delete the application
    DeleteApplication,
}

impl Action {
    /// Stable name used in logs and artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Call => "call",
            Action::OptIn => "opt-in",
            Action::CloseOut => "close-out",
            Action::ClearState => "clear-state",
            Action::UpdateApplication => "update-application",
            Action::DeleteApplication => "delete-application",
        }
    }

    /// Whether this is a lifecycle action rather than a workflow call
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Action::Call)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
