//! Main entry point for custody.
//!
//! This module provides the [`Custody`] handle, a typed wrapper over the
//! invocation [`Executor`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use custody_core::{AccountId, Action, Command, Scope, StateRecord, Variant};
use custody_engine::{Config, Database};
use custody_executor::{Executor, Invocation, Output, Program};

use crate::error::{Error, Result};

/// A custody workflow instance.
///
/// Each method submits exactly one invocation. Rejected invocations return
/// an error and change nothing.
///
/// # Example
///
/// ```ignore
/// use custody::prelude::*;
///
/// let custody = Custody::ephemeral(Variant::Global);
/// custody.create("creator")?;
/// custody.item_dropped("courier")?;
/// custody.item_delivered("courier")?;
/// let record = custody.item_received("buyer")?;
/// assert!(record.payment_released);
/// ```
pub struct Custody {
    executor: Executor,
}

impl Custody {
    /// Open a durable instance backed by the snapshot at `path`.
    ///
    /// Uses the global variant; see [`Custody::builder`] for other settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory instance with no disk I/O.
    pub fn ephemeral(variant: Variant) -> Self {
        Self::from_database(Database::ephemeral(variant))
    }

    /// Create a builder for custody configuration.
    ///
    /// ```ignore
    /// let custody = Custody::builder()
    ///     .variant(Variant::PerAccount)
    ///     .path("./state.snap")
    ///     .open()?;
    /// ```
    pub fn builder() -> CustodyBuilder {
        CustodyBuilder::new()
    }

    fn from_database(db: Database) -> Self {
        Custody {
            executor: Executor::new(Arc::new(db)),
        }
    }

    /// The underlying executor
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Workflow variant
    pub fn variant(&self) -> Variant {
        self.executor.variant()
    }

    /// Submit a raw invocation.
    pub fn execute(&self, invocation: &Invocation) -> Result<Output> {
        self.executor.execute(invocation).map_err(Error::from)
    }

    fn lifecycle(&self, sender: &str, action: Action) -> Result<()> {
        match self.execute(&Invocation::lifecycle(sender, action))? {
            Output::Accepted { .. } => Ok(()),
            _ => Err(Error::Internal(format!("unexpected output for {}", action))),
        }
    }

    /// Create the application. Accepted once.
    pub fn create(&self, sender: &str) -> Result<()> {
        self.lifecycle(sender, Action::Create)
    }

    /// Register `account`.
    pub fn opt_in(&self, account: &str) -> Result<()> {
        self.lifecycle(account, Action::OptIn)
    }

    /// Deregister `account`. Its record is kept.
    pub fn close_out(&self, account: &str) -> Result<()> {
        self.lifecycle(account, Action::CloseOut)
    }

    /// Force-deregister `account`. Always acknowledged.
    pub fn clear_state(&self, account: &str) -> Result<()> {
        self.lifecycle(account, Action::ClearState)
    }

    /// Request an application update. Always denied.
    pub fn update_application(&self, sender: &str) -> Result<()> {
        self.lifecycle(sender, Action::UpdateApplication)
    }

    /// Request application deletion. Always denied.
    pub fn delete_application(&self, sender: &str) -> Result<()> {
        self.lifecycle(sender, Action::DeleteApplication)
    }

    /// Submit a workflow command and return the resulting record.
    pub fn call(&self, sender: &str, command: Command) -> Result<StateRecord> {
        let output = self.execute(&Invocation::call(sender, command.as_str()))?;
        output
            .record()
            .copied()
            .ok_or_else(|| Error::Internal(format!("unexpected output for {}", command)))
    }

    /// `ItemInCart` (per-account only)
    pub fn item_in_cart(&self, sender: &str) -> Result<StateRecord> {
        self.call(sender, Command::ItemInCart)
    }

    /// `ItemDropped`
    pub fn item_dropped(&self, sender: &str) -> Result<StateRecord> {
        self.call(sender, Command::ItemDropped)
    }

    /// `ItemDelivered`
    pub fn item_delivered(&self, sender: &str) -> Result<StateRecord> {
        self.call(sender, Command::ItemDelivered)
    }

    /// `ItemReceived`; releases payment
    pub fn item_received(&self, sender: &str) -> Result<StateRecord> {
        self.call(sender, Command::ItemReceived)
    }

    /// `Reset`; accepted from any stage
    pub fn reset(&self, sender: &str) -> Result<StateRecord> {
        self.call(sender, Command::Reset)
    }

    /// Committed record for `scope`.
    pub fn record(&self, scope: &Scope) -> Result<StateRecord> {
        self.executor.record(scope).map_err(Error::from)
    }

    /// The record a call from `sender` would act on.
    pub fn record_for(&self, sender: &str) -> Result<StateRecord> {
        self.record(&self.variant().scope_for(&AccountId::new(sender)))
    }

    /// Whether `account` is registered.
    pub fn is_registered(&self, account: &str) -> Result<bool> {
        self.executor
            .is_registered(&AccountId::new(account))
            .map_err(Error::from)
    }

    /// Whether the application has been created.
    pub fn is_created(&self) -> Result<bool> {
        self.executor.is_created().map_err(Error::from)
    }

    /// Scopes holding a workflow record.
    pub fn scopes(&self) -> Vec<Scope> {
        self.executor.scopes()
    }

    /// Program artifacts for this instance's variant.
    pub fn program(&self) -> Program {
        Program::compile(self.variant())
    }

    /// Write the snapshot now, if durable.
    pub fn flush(&self) -> Result<()> {
        self.executor.database().flush().map_err(Error::from)
    }
}

impl std::fmt::Debug for Custody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Custody")
            .field("executor", &self.executor)
            .finish()
    }
}

/// Builder for custody configuration.
///
/// ```ignore
/// // Durable, per-account
/// let custody = Custody::builder()
///     .variant(Variant::PerAccount)
///     .path("./state.snap")
///     .open()?;
///
/// // From a TOML file
/// let custody = Custody::builder().config_file("custody.toml")?.open()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CustodyBuilder {
    config: Config,
}

impl CustodyBuilder {
    /// Create a new builder with default settings (in-memory, global).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.config = self.config.variant(variant);
        self
    }

    /// Persist to a snapshot file at `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config = self.config.snapshot(PathBuf::from(path.as_ref()));
        self
    }

    /// Keep state in memory only.
    pub fn ephemeral(mut self) -> Self {
        self.config = self.config.ephemeral();
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML file.
    pub fn config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.config(Config::load(path)?))
    }

    /// Open the instance.
    pub fn open(self) -> Result<Custody> {
        let db = Database::open(self.config)?;
        tracing::debug!(
            variant = %db.variant(),
            durability = ?db.config().durability,
            version = db.version(),
            "opened custody instance"
        );
        Ok(Custody::from_database(db))
    }
}
