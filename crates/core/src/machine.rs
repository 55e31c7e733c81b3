//! Stage machine: the single transition validator for both variants
//!
//! Legal transitions are data, not code. Each variant owns a table of
//! [`TransitionRule`]s keyed by command; [`StageMachine::transition`] looks the
//! command up, checks the exact precondition stage and produces the next
//! record. `Reset` is not in any table and always succeeds.
//!
//! The two tables read command names differently. Under the global variant a
//! name denotes the stage being *left* (`ItemDropped` moves a record out of
//! `Dropped`). Under the per-account variant it denotes the stage being
//! *entered* (`ItemDropped` moves a record into `Dropped`, 2→3). Both tables
//! are one-step chains over their own sequence:
//!
//! ```text
//! global:      1 --ItemDropped--> 2 --ItemDelivered--> 3 --ItemReceived--> 4*
//! per-account: 1 --ItemInCart--> 2 --ItemDropped--> 3 --ItemDelivered--> 4 --ItemReceived--> 5*
//! ```
//!
//! `*` marks the terminal stage, the only one whose entering transition sets
//! the release flag.

use serde::Serialize;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::record::StateRecord;
use crate::stage::{Stage, Variant};

/// One legal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    /// Command that triggers the transition
    pub command: Command,
    /// Stage the record must be in
    pub expected: Stage,
    /// Stage the record moves to
    pub next: Stage,
    /// Whether the transition sets the release flag
    pub releases_payment: bool,
}

const fn rule(command: Command, expected: u64, next: u64, releases_payment: bool) -> TransitionRule {
    TransitionRule {
        command,
        expected: Stage::new(expected),
        next: Stage::new(next),
        releases_payment,
    }
}

const GLOBAL_RULES: &[TransitionRule] = &[
    rule(Command::ItemDropped, 1, 2, false),
    rule(Command::ItemDelivered, 2, 3, false),
    rule(Command::ItemReceived, 3, 4, true),
];

const ACCOUNT_RULES: &[TransitionRule] = &[
    rule(Command::ItemInCart, 1, 2, false),
    rule(Command::ItemDropped, 2, 3, false),
    rule(Command::ItemDelivered, 3, 4, false),
    rule(Command::ItemReceived, 4, 5, true),
];

impl Variant {
    /// The variant's transition table, in workflow order
    pub fn rules(&self) -> &'static [TransitionRule] {
        match self {
            Variant::Global => GLOBAL_RULES,
            Variant::PerAccount => ACCOUNT_RULES,
        }
    }

    /// Commands this variant accepts, `Reset` included
    pub fn commands(&self) -> Vec<Command> {
        self.rules()
            .iter()
            .map(|r| r.command)
            .chain(std::iter::once(Command::Reset))
            .collect()
    }

    /// Whether the variant recognizes `command`
    pub fn recognizes(&self, command: Command) -> bool {
        command == Command::Reset || self.rule_for(command).is_some()
    }

    /// The table entry for `command`, if any
    pub fn rule_for(&self, command: Command) -> Option<&'static TransitionRule> {
        self.rules().iter().find(|r| r.command == command)
    }
}

/// Pure transition validator, parameterized by variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageMachine {
    variant: Variant,
}

impl StageMachine {
    /// Create a machine for `variant`
    pub fn new(variant: Variant) -> Self {
        StageMachine { variant }
    }

    /// The variant this machine validates against
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The record every scope starts with and `Reset` returns to
    pub fn initial_record(&self) -> StateRecord {
        StateRecord {
            stage: self.variant.initial_stage(),
            payment_released: false,
        }
    }

    /// Validate `command` against `current` and compute the next record
    ///
    /// # Errors
    ///
    /// - `MalformedInvocation` if the variant has no rule for `command`
    /// - `Corruption` if `current` holds a stage outside the variant's sequence
    /// - `InvalidTransition` if `current` is not at the rule's expected stage
    ///
    /// On error the caller's record is untouched; this function never
    /// mutates its input.
    pub fn transition(&self, current: &StateRecord, command: Command) -> Result<StateRecord> {
        if command == Command::Reset {
            return Ok(self.initial_record());
        }

        let rule = self.variant.rule_for(command).ok_or_else(|| {
            Error::malformed(format!(
                "command {} is not available in the {} variant",
                command, self.variant
            ))
        })?;

        if !self.variant.contains(current.stage) {
            return Err(Error::Corruption(format!(
                "stage {} is outside the {} sequence",
                current.stage, self.variant
            )));
        }

        if current.stage != rule.expected {
            return Err(Error::InvalidTransition {
                command,
                expected: rule.expected,
                actual: current.stage,
            });
        }

        Ok(StateRecord {
            stage: rule.next,
            payment_released: rule.releases_payment || current.payment_released,
        })
    }
}

/// Free-function form of [`StageMachine::transition`]
pub fn transition(variant: Variant, current: &StateRecord, command: Command) -> Result<StateRecord> {
    StageMachine::new(variant).transition(current, command)
}
