//! Transaction context: buffered reads and writes for one invocation
//!
//! Nothing a transaction writes is visible to anyone else until the
//! [`TransactionManager`](crate::TransactionManager) commits it. Every first
//! read of a key records the version it saw; commit re-checks those versions
//! so a check-then-write never acts on a stale read.

use std::collections::{BTreeMap, BTreeSet};

use custody_core::{Error, Field, Key, Result, Scope, StateRecord, StateStore, Storage};

/// Lifecycle of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting reads and writes
    Active,
    /// Writes applied at `version`
    Committed {
        /// Commit version (unchanged store version for read-only commits)
        version: u64,
    },
    /// Discarded; nothing was applied
    Aborted {
        /// Why the transaction was aborted
        reason: String,
    },
}

/// Read/write set tracking for a single transaction
pub struct TransactionContext<'a> {
    /// Unique transaction identifier
    pub txn_id: u64,
    /// Store version when the transaction began
    pub start_version: u64,
    /// Current status
    pub status: TransactionStatus,
    store: &'a dyn Storage,
    /// Version observed on first read of each key (0 = absent)
    read_set: BTreeMap<Key, u64>,
    write_set: BTreeMap<Key, u64>,
    delete_set: BTreeSet<Key>,
}

impl<'a> TransactionContext<'a> {
    /// Begin a transaction against `store`
    pub fn new(txn_id: u64, store: &'a dyn Storage) -> Self {
        TransactionContext {
            txn_id,
            start_version: store.current_version(),
            status: TransactionStatus::Active,
            store,
            read_set: BTreeMap::new(),
            write_set: BTreeMap::new(),
            delete_set: BTreeSet::new(),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        match &self.status {
            TransactionStatus::Active => Ok(()),
            other => Err(Error::Storage(format!(
                "transaction {} is not active ({:?})",
                self.txn_id, other
            ))),
        }
    }

    /// Whether the transaction is still accepting operations
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Read a field, seeing this transaction's own pending writes
    pub fn get_field(&mut self, key: &Key) -> Result<Option<u64>> {
        self.ensure_active()?;

        if let Some(value) = self.write_set.get(key) {
            return Ok(Some(*value));
        }
        if self.delete_set.contains(key) {
            return Ok(None);
        }

        let committed = self.store.get(key);
        self.read_set
            .entry(key.clone())
            .or_insert_with(|| committed.map(|v| v.version).unwrap_or(0));
        Ok(committed.map(|v| v.value))
    }

    /// Buffer a write
    pub fn put_field(&mut self, key: Key, value: u64) -> Result<()> {
        self.ensure_active()?;
        self.delete_set.remove(&key);
        self.write_set.insert(key, value);
        Ok(())
    }

    /// Buffer a delete
    pub fn delete_field(&mut self, key: Key) -> Result<()> {
        self.ensure_active()?;
        self.write_set.remove(&key);
        self.delete_set.insert(key);
        Ok(())
    }

    /// Whether the transaction has buffered no writes or deletes
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.delete_set.is_empty()
    }

    /// Number of keys read from committed storage
    pub fn read_count(&self) -> usize {
        self.read_set.len()
    }

    /// Number of buffered writes and deletes
    pub fn write_count(&self) -> usize {
        self.write_set.len() + self.delete_set.len()
    }

    /// Buffered writes, in key order
    pub fn pending_writes(&self) -> impl Iterator<Item = (&Key, u64)> + '_ {
        self.write_set.iter().map(|(k, v)| (k, *v))
    }

    /// Buffered deletes, in key order
    pub fn pending_deletes(&self) -> impl Iterator<Item = &Key> + '_ {
        self.delete_set.iter()
    }

    /// Keys whose committed version differs from the one this transaction read
    pub fn conflicting_keys(&self) -> Vec<Key> {
        self.read_set
            .iter()
            .filter(|(key, seen)| {
                let current = self.store.get(key).map(|v| v.version).unwrap_or(0);
                current != **seen
            })
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Apply buffered writes to the store at `version`
    ///
    /// Callers must hold the commit lock and have validated the read set.
    pub(crate) fn apply_writes(&mut self, version: u64) -> Result<()> {
        let writes: Vec<(Key, u64)> = self
            .write_set
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        let deletes: Vec<Key> = self.delete_set.iter().cloned().collect();
        self.store.apply_batch(&writes, &deletes, version)
    }

    pub(crate) fn store(&self) -> &'a dyn Storage {
        self.store
    }

    /// Discard all buffered operations
    pub fn mark_aborted(&mut self, reason: impl Into<String>) {
        self.write_set.clear();
        self.delete_set.clear();
        self.status = TransactionStatus::Aborted {
            reason: reason.into(),
        };
    }
}

impl StateStore for TransactionContext<'_> {
    fn get(&mut self, scope: &Scope) -> Result<StateRecord> {
        let stage = self.get_field(&Key::new(scope.clone(), Field::Stage))?;
        let released = self.get_field(&Key::new(scope.clone(), Field::PaymentReleased))?;
        StateRecord::from_fields(stage, released)
    }

    fn put(&mut self, scope: &Scope, record: StateRecord) -> Result<()> {
        for (field, value) in record.to_fields() {
            self.put_field(Key::new(scope.clone(), field), value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TransactionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("start_version", &self.start_version)
            .field("status", &self.status)
            .field("reads", &self.read_set.len())
            .field("writes", &self.write_count())
            .finish()
    }
}
