//! Lifecycle gate: fixed accept/deny policy for non-workflow actions
//!
//! | Action | Policy | Effect |
//! |--------|--------|--------|
//! | create | accept once | marks the application created; global variant also writes the initial record |
//! | opt-in | accept | registers the sender |
//! | close-out | accept | deregisters the sender |
//! | clear-state | accept | deregisters the sender |
//! | update-application | deny | |
//! | delete-application | deny | |
//!
//! Teardown only clears the registration. Workflow records are never
//! deleted, so an account that registers again finds its record as it left it.

use custody_concurrency::TransactionContext;
use custody_core::{
    AccountId, Action, Error, Field, Key, Result, Scope, StageMachine, StateStore, Variant,
};
use serde::Serialize;

use crate::output::Output;

/// Whether an action is permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Always permitted
    Accept,
    /// Permitted only before the application exists
    AcceptOnce,
    /// Never permitted
    Deny,
}

const POLICY_TABLE: &[(Action, Policy)] = &[
    (Action::Create, Policy::AcceptOnce),
    (Action::OptIn, Policy::Accept),
    (Action::CloseOut, Policy::Accept),
    (Action::ClearState, Policy::Accept),
    (Action::UpdateApplication, Policy::Deny),
    (Action::DeleteApplication, Policy::Deny),
];

fn created_key() -> Key {
    Key::new(Scope::Global, Field::Created)
}

fn registration_key(account: &AccountId) -> Key {
    Key::new(Scope::Account(account.clone()), Field::OptedIn)
}

/// Whether the application has been created
pub(crate) fn is_created(txn: &mut TransactionContext<'_>) -> Result<bool> {
    Ok(txn.get_field(&created_key())?.unwrap_or(0) != 0)
}

/// Whether `account` is registered
pub(crate) fn is_registered(txn: &mut TransactionContext<'_>, account: &AccountId) -> Result<bool> {
    Ok(txn.get_field(&registration_key(account))?.unwrap_or(0) != 0)
}

/// Applies lifecycle actions
#[derive(Debug, Clone, Copy)]
pub struct LifecycleGate {
    variant: Variant,
}

impl LifecycleGate {
    /// Create a gate for `variant`
    pub fn new(variant: Variant) -> Self {
        LifecycleGate { variant }
    }

    /// The fixed policy table
    pub fn policy_table() -> &'static [(Action, Policy)] {
        POLICY_TABLE
    }

    /// Policy for `action`, or `None` for workflow calls
    pub fn policy(action: Action) -> Option<Policy> {
        POLICY_TABLE
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, p)| *p)
    }

    /// Apply a lifecycle action from `sender` inside `txn`
    ///
    /// # Errors
    ///
    /// `MalformedInvocation` for denied actions, a repeated create, or a
    /// workflow call routed here by mistake.
    pub fn apply(
        &self,
        txn: &mut TransactionContext<'_>,
        sender: &AccountId,
        action: Action,
    ) -> Result<Output> {
        match action {
            Action::Create => {
                if is_created(txn)? {
                    return Err(Error::malformed("application already created"));
                }
                txn.put_field(created_key(), 1)?;
                if self.variant == Variant::Global {
                    let initial = StageMachine::new(self.variant).initial_record();
                    txn.put(&Scope::Global, initial)?;
                }
            }
            Action::OptIn => {
                txn.put_field(registration_key(sender), 1)?;
            }
            Action::CloseOut | Action::ClearState => {
                txn.delete_field(registration_key(sender))?;
            }
            Action::UpdateApplication | Action::DeleteApplication => {
                return Err(Error::malformed(format!("{} is denied", action)));
            }
            Action::Call => {
                return Err(Error::malformed(format!("{} is not a lifecycle action", action)));
            }
        }

        tracing::info!(%sender, %action, variant = %self.variant, "lifecycle action accepted");
        Ok(Output::Accepted { action })
    }
}
