//! Workflow stages and deployment variants
//!
//! Each [`Variant`] owns an ordered, finite sequence of stages. Stages are
//! persisted as plain integers starting at 1; [`Stage`] is the newtype over
//! that integer, and [`GlobalStage`]/[`AccountStage`] give the positions
//! their names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::{AccountId, Scope};

/// Position in a variant's ordered stage sequence
///
/// Stages compare by position, so `a < b` means `a` comes earlier in the
/// workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(u64);

impl Stage {
    /// First stage of every variant
    pub const INITIAL: Stage = Stage(1);

    /// Wrap a persisted stage value
    pub const fn new(value: u64) -> Self {
        Stage(value)
    }

    /// The persisted integer
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stages of the global (single-party) workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalStage {
    /// Item handed to the carrier
    Dropped = 1,
    /// Item delivered to the recipient
    Delivered = 2,
    /// Receipt confirmed
    Received = 3,
    /// Payment released
    Finalized = 4,
}

impl From<GlobalStage> for Stage {
    fn from(s: GlobalStage) -> Self {
        Stage(s as u64)
    }
}

/// Stages of the per-account (multi-party) workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountStage {
    /// Item placed in the cart
    InCart = 1,
    /// Order placed
    Ordered = 2,
    /// Item handed to the carrier
    Dropped = 3,
    /// Item delivered to the recipient
    Delivered = 4,
    /// Receipt confirmed and payment released
    Received = 5,
}

impl From<AccountStage> for Stage {
    fn from(s: AccountStage) -> Self {
        Stage(s as u64)
    }
}

const GLOBAL_STAGE_NAMES: &[&str] = &["Dropped", "Delivered", "Received", "Finalized"];
const ACCOUNT_STAGE_NAMES: &[&str] = &["InCart", "Ordered", "Dropped", "Delivered", "Received"];

/// Deployment variant
///
/// The variant decides which stage sequence and transition table apply and
/// how an invocation's sender maps to a storage [`Scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// One process-wide record shared by every sender
    Global,
    /// One independent record per registered account
    PerAccount,
}

impl Variant {
    /// Stable name used in configuration and artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Global => "global",
            Variant::PerAccount => "per-account",
        }
    }

    fn stage_names(&self) -> &'static [&'static str] {
        match self {
            Variant::Global => GLOBAL_STAGE_NAMES,
            Variant::PerAccount => ACCOUNT_STAGE_NAMES,
        }
    }

    /// Stage every record starts in and returns to on reset
    pub fn initial_stage(&self) -> Stage {
        Stage::INITIAL
    }

    /// Last stage of the sequence; reaching it releases payment
    pub fn terminal_stage(&self) -> Stage {
        Stage(self.stage_names().len() as u64)
    }

    /// All stages in order
    pub fn stages(&self) -> impl Iterator<Item = Stage> {
        (1..=self.stage_names().len() as u64).map(Stage)
    }

    /// Whether `stage` belongs to this variant's sequence
    pub fn contains(&self, stage: Stage) -> bool {
        stage >= self.initial_stage() && stage <= self.terminal_stage()
    }

    /// Human-readable name of a stage, if it belongs to this variant
    pub fn stage_name(&self, stage: Stage) -> Option<&'static str> {
        if !self.contains(stage) {
            return None;
        }
        self.stage_names().get(stage.0 as usize - 1).copied()
    }

    /// Scope addressed by an invocation from `sender`
    pub fn scope_for(&self, sender: &AccountId) -> Scope {
        match self {
            Variant::Global => Scope::Global,
            Variant::PerAccount => Scope::Account(sender.clone()),
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Global
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Variant::Global),
            "per-account" => Ok(Variant::PerAccount),
            other => Err(Error::Config(format!(
                "unknown variant '{}', expected 'global' or 'per-account'",
                other
            ))),
        }
    }
}
