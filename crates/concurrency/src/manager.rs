//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation (first-committer-wins on the read set)
//! 2. Version allocation
//! 3. Storage application (visibility)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. acquire commit lock
//! 2. validate read set against committed versions
//! 3. IF conflicts: abort and return Conflict
//! 4. IF no writes: mark committed at the current version, return
//! 5. allocate commit_version = current + 1
//! 6. run the pre-apply hook (durability); IF it fails: abort
//! 7. apply_batch() to storage
//! 8. mark committed, return commit_version
//! ```
//!
//! A transaction that is dropped or aborted before step 7 leaves storage
//! untouched.

use std::sync::atomic::{AtomicU64, Ordering};

use custody_core::{Error, Result, Storage};
use parking_lot::Mutex;

use crate::{TransactionContext, TransactionStatus};

/// Manages transaction lifecycle and atomic commits
///
/// # Thread Safety
///
/// Commit is serialized via an internal lock so no other transaction can
/// modify storage between validation and apply.
pub struct TransactionManager {
    /// Next transaction ID
    next_txn_id: AtomicU64,

    /// Commit serialization lock
    commit_lock: Mutex<()>,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(1),
            commit_lock: Mutex::new(()),
        }
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Begin a transaction against `store`
    pub fn begin<'a>(&self, store: &'a dyn Storage) -> TransactionContext<'a> {
        TransactionContext::new(self.next_txn_id(), store)
    }

    /// Commit a transaction atomically
    ///
    /// # Returns
    /// - Ok(commit_version) on success
    /// - Err(Conflict) if any key read by the transaction changed since
    /// - Err(Storage) if the transaction is not active or apply fails
    pub fn commit(&self, txn: &mut TransactionContext<'_>) -> Result<u64> {
        self.commit_with(txn, |_, _| Ok(()))
    }

    /// Commit a transaction, running `before_apply` between validation and apply
    ///
    /// `before_apply` sees the validated transaction and its commit version
    /// while the commit lock is held. If it fails the transaction is aborted
    /// and storage is left untouched. Read-only commits skip it.
    pub fn commit_with<H>(&self, txn: &mut TransactionContext<'_>, before_apply: H) -> Result<u64>
    where
        H: FnOnce(&TransactionContext<'_>, u64) -> Result<()>,
    {
        let _commit_guard = self.commit_lock.lock();

        if !txn.is_active() {
            return Err(Error::Storage(format!(
                "cannot commit transaction {} ({:?})",
                txn.txn_id, txn.status
            )));
        }

        let conflicts = txn.conflicting_keys();
        if !conflicts.is_empty() {
            let keys: Vec<String> = conflicts.iter().map(|k| k.to_string()).collect();
            let reason = format!("read set changed: {}", keys.join(", "));
            txn.mark_aborted(reason.clone());
            tracing::debug!(txn_id = txn.txn_id, %reason, "commit conflict");
            return Err(Error::Conflict(reason));
        }

        if txn.is_read_only() {
            let version = txn.store().current_version();
            txn.status = TransactionStatus::Committed { version };
            return Ok(version);
        }

        let commit_version = txn.store().current_version() + 1;
        if let Err(e) = before_apply(&*txn, commit_version) {
            tracing::debug!(txn_id = txn.txn_id, commit_version, error = %e, "pre-apply hook failed");
            txn.mark_aborted(format!("pre-apply failed: {}", e));
            return Err(e);
        }
        if let Err(e) = txn.apply_writes(commit_version) {
            tracing::error!(
                txn_id = txn.txn_id,
                commit_version,
                error = %e,
                "storage application failed"
            );
            txn.mark_aborted(format!("apply failed: {}", e));
            return Err(e);
        }

        txn.status = TransactionStatus::Committed {
            version: commit_version,
        };
        tracing::debug!(
            txn_id = txn.txn_id,
            commit_version,
            writes = txn.write_count(),
            "committed"
        );
        Ok(commit_version)
    }

    /// Explicitly abort a transaction
    ///
    /// All buffered operations are discarded; storage is never touched.
    pub fn abort(&self, txn: &mut TransactionContext<'_>, reason: impl Into<String>) {
        txn.mark_aborted(reason);
    }

    /// Run `f` inside a transaction, committing on `Ok` and aborting on `Err`
    ///
    /// This is the all-or-nothing unit an invocation executes in: either
    /// every write made by `f` becomes visible, or none does.
    pub fn run<T, F>(&self, store: &dyn Storage, f: F) -> Result<(T, u64)>
    where
        F: FnOnce(&mut TransactionContext<'_>) -> Result<T>,
    {
        self.run_with(store, f, |_, _| Ok(()))
    }

    /// [`run`](Self::run) with a pre-apply hook, see [`commit_with`](Self::commit_with)
    pub fn run_with<T, F, H>(&self, store: &dyn Storage, f: F, before_apply: H) -> Result<(T, u64)>
    where
        F: FnOnce(&mut TransactionContext<'_>) -> Result<T>,
        H: FnOnce(&TransactionContext<'_>, u64) -> Result<()>,
    {
        let mut txn = self.begin(store);
        match f(&mut txn) {
            Ok(value) => {
                let version = self.commit_with(&mut txn, before_apply)?;
                Ok((value, version))
            }
            Err(e) => {
                self.abort(&mut txn, e.to_string());
                Err(e)
            }
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
