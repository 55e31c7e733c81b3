//! Executor: the single entry point for invocations
//!
//! Every invocation runs as one transaction. The executor checks the
//! invocation's shape, routes lifecycle actions to the [`LifecycleGate`] and
//! workflow calls to the [`StageMachine`], and commits the result only when
//! the whole invocation is accepted. A rejected invocation leaves storage
//! exactly as it was.
//!
//! Invocations are applied one at a time, in submission order. The
//! transaction layer would reject a stale read-then-write anyway; the lock
//! keeps rejections from being caused by interleaving rather than by the
//! workflow itself.

use std::sync::Arc;

use custody_concurrency::TransactionContext;
use custody_core::{
    AccountId, Action, Command, Error, Field, Result, Scope, StageMachine, StateRecord,
    StateStore, Variant,
};
use custody_engine::Database;
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::gate::{is_created, is_registered, LifecycleGate};
use crate::invocation::{Invocation, Operation};
use crate::output::Output;

/// Dispatches invocations against a [`Database`]
pub struct Executor {
    db: Arc<Database>,
    machine: StageMachine,
    gate: LifecycleGate,
    invocation_lock: Mutex<()>,
}

impl Executor {
    /// Create an executor over `db`, using the database's variant
    pub fn new(db: Arc<Database>) -> Self {
        let variant = db.variant();
        Executor {
            db,
            machine: StageMachine::new(variant),
            gate: LifecycleGate::new(variant),
            invocation_lock: Mutex::new(()),
        }
    }

    /// The underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Workflow variant
    pub fn variant(&self) -> Variant {
        self.machine.variant()
    }

    /// Execute one invocation
    ///
    /// # Errors
    ///
    /// - `MalformedInvocation` for a bundled or empty invocation, an unknown
    ///   or missing command, a call before the application exists, a call
    ///   from an unregistered account (per-account variant), or a denied
    ///   lifecycle action
    /// - `InvalidTransition` when the record is not at the command's
    ///   expected stage
    ///
    /// Storage is unchanged whenever an error is returned.
    pub fn execute(&self, invocation: &Invocation) -> Result<Output> {
        let _serial = self.invocation_lock.lock();

        let result = invocation.operation().and_then(|op| {
            self.db
                .transaction(|txn| self.dispatch(txn, &invocation.sender, op))
        });

        match &result {
            Ok(output) => debug!(sender = %invocation.sender, ?output, "invocation accepted"),
            Err(e) if e.is_rejection() => {
                warn!(sender = %invocation.sender, error = %e, "invocation rejected")
            }
            Err(e) => error!(sender = %invocation.sender, error = %e, "invocation failed"),
        }
        result
    }

    fn dispatch(
        &self,
        txn: &mut TransactionContext<'_>,
        sender: &AccountId,
        op: &Operation,
    ) -> Result<Output> {
        if sender.as_str().is_empty() {
            return Err(Error::malformed("sender is empty"));
        }
        if op.action != Action::Create && !is_created(txn)? {
            return Err(Error::malformed(format!(
                "{} before the application was created",
                op.action
            )));
        }

        if op.action.is_lifecycle() {
            return self.gate.apply(txn, sender, op.action);
        }

        let command: Command = op
            .command_arg()
            .ok_or_else(|| Error::malformed("call carries no command argument"))?
            .parse()?;
        let variant = self.variant();
        if !variant.recognizes(command) {
            return Err(Error::malformed(format!(
                "{} is not a {} command",
                command, variant
            )));
        }
        if variant == Variant::PerAccount && !is_registered(txn, sender)? {
            return Err(Error::malformed(format!("{} has not opted in", sender)));
        }

        let scope = variant.scope_for(sender);
        let previous = txn.get(&scope)?;
        let record = self.machine.transition(&previous, command)?;
        txn.put(&scope, record)?;

        Ok(Output::Transitioned {
            scope,
            command,
            previous,
            record,
        })
    }

    /// Committed record for `scope`; never-written scopes read as the initial record
    pub fn record(&self, scope: &Scope) -> Result<StateRecord> {
        self.db.record(scope)
    }

    /// Whether `account` is currently registered
    pub fn is_registered(&self, account: &AccountId) -> Result<bool> {
        self.db.transaction(|txn| is_registered(txn, account))
    }

    /// Whether the application has been created
    pub fn is_created(&self) -> Result<bool> {
        self.db.transaction(is_created)
    }

    /// Scopes that hold a workflow record, in order
    pub fn scopes(&self) -> Vec<Scope> {
        let store = self.db.storage();
        store
            .scopes()
            .into_iter()
            .filter(|scope| store.list_scope(scope).iter().any(|(f, _)| *f == Field::Stage))
            .collect()
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("variant", &self.variant())
            .field("db", &self.db)
            .finish()
    }
}
