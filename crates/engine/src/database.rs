//! Database: storage, transactions and durability behind one handle

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use custody_concurrency::{TransactionContext, TransactionManager};
use custody_core::{Error, Key, Result, Scope, StateRecord, StateStore, Variant, Versioned};
use custody_storage::format::snapshot::{read_snapshot, write_snapshot, Snapshot};
use custody_storage::ShardedStore;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::config::Config;
use crate::durability::DurabilityMode;

/// The custody database
///
/// Every state change goes through [`Database::transaction`], which gives
/// the closure a private [`TransactionContext`] and commits its writes only
/// if the closure succeeds.
///
/// # Example
///
/// ```ignore
/// use custody_engine::{Config, Database};
///
/// let db = Database::open(Config::new().snapshot("./state.snap"))?;
/// let record = db.record(&Scope::Global)?;
/// ```
pub struct Database {
    config: Config,
    store: ShardedStore,
    manager: TransactionManager,
    /// Serializes snapshot file writes
    persist_lock: Mutex<()>,
}

impl Database {
    /// Open a database, restoring the snapshot if one exists
    ///
    /// # Errors
    ///
    /// - `Config` if the configuration is inconsistent, or the snapshot was
    ///   written under a different variant
    /// - `Corruption`/`Serialization` if the snapshot cannot be decoded
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let store = match (config.durability, &config.path) {
            (DurabilityMode::Snapshot, Some(path)) => match read_snapshot(path)? {
                Some(snapshot) => {
                    if snapshot.variant != config.variant {
                        return Err(Error::Config(format!(
                            "snapshot {} was written by the {} variant, not {}",
                            path.display(),
                            snapshot.variant,
                            config.variant
                        )));
                    }
                    info!(
                        path = %path.display(),
                        version = snapshot.version,
                        entries = snapshot.entries.len(),
                        "restored snapshot"
                    );
                    ShardedStore::from_entries(snapshot.entries, snapshot.version)
                }
                None => {
                    info!(path = %path.display(), "no snapshot found, starting empty");
                    ShardedStore::new()
                }
            },
            _ => ShardedStore::new(),
        };

        Ok(Database {
            config,
            store,
            manager: TransactionManager::new(),
            persist_lock: Mutex::new(()),
        })
    }

    /// Create an in-memory database with no disk I/O
    pub fn ephemeral(variant: Variant) -> Self {
        Database {
            config: Config::new().variant(variant),
            store: ShardedStore::new(),
            manager: TransactionManager::new(),
            persist_lock: Mutex::new(()),
        }
    }

    /// The configuration this database was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Workflow variant
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    /// Snapshot path, when durable
    pub fn path(&self) -> Option<&PathBuf> {
        self.config.path.as_ref()
    }

    /// Committed storage
    pub fn storage(&self) -> &ShardedStore {
        &self.store
    }

    /// Highest committed version
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Run `f` as one atomic unit
    ///
    /// Writes made by `f` are applied only if `f` returns `Ok` and the read
    /// set validates; otherwise nothing is applied and the error is returned.
    /// In snapshot mode a state-changing commit writes the snapshot of the
    /// resulting state first, and a failed write aborts the commit.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TransactionContext<'_>) -> Result<T>,
    {
        let (value, _) = self
            .manager
            .run_with(&self.store, f, |txn, version| self.persist_pending(txn, version))?;
        Ok(value)
    }

    /// Read the committed record for `scope`
    pub fn record(&self, scope: &Scope) -> Result<StateRecord> {
        self.transaction(|txn| txn.get(scope))
    }

    /// Write the snapshot now, if this database is durable
    pub fn flush(&self) -> Result<()> {
        self.persist()
    }

    fn snapshot_path(&self) -> Option<&Path> {
        match (self.config.durability, &self.config.path) {
            (DurabilityMode::Snapshot, Some(path)) => Some(path.as_path()),
            _ => None,
        }
    }

    fn persist(&self) -> Result<()> {
        let path = match self.snapshot_path() {
            Some(path) => path,
            None => return Ok(()),
        };

        let _guard = self.persist_lock.lock();
        let snapshot = Snapshot {
            variant: self.config.variant,
            version: self.store.version(),
            entries: self.store.entries(),
        };
        self.write(path, &snapshot)
    }

    /// Write the state `txn` would produce at `version`, before it is applied
    fn persist_pending(&self, txn: &TransactionContext<'_>, version: u64) -> Result<()> {
        let path = match self.snapshot_path() {
            Some(path) => path,
            None => return Ok(()),
        };

        let _guard = self.persist_lock.lock();
        let mut entries: BTreeMap<Key, Versioned> = self.store.entries().into_iter().collect();
        for (key, value) in txn.pending_writes() {
            entries.insert(key.clone(), Versioned::new(value, version));
        }
        for key in txn.pending_deletes() {
            entries.remove(key);
        }
        let snapshot = Snapshot {
            variant: self.config.variant,
            version,
            entries: entries.into_iter().collect(),
        };
        self.write(path, &snapshot)
    }

    fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<()> {
        write_snapshot(path, snapshot).map_err(|e| {
            error!(path = %path.display(), error = %e, "snapshot write failed");
            Error::Storage(format!("snapshot write failed: {}", e))
        })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("variant", &self.config.variant)
            .field("durability", &self.config.durability)
            .field("version", &self.store.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::{Field, Key, Stage};

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::ephemeral(Variant::Global);
        db.transaction(|txn| txn.put(&Scope::Global, StateRecord::new(Stage::new(2), false)))
            .unwrap();
        assert_eq!(db.record(&Scope::Global).unwrap().stage, Stage::new(2));
        assert_eq!(db.version(), 1);
    }

    #[test]
    fn test_transaction_discards_on_err() {
        let db = Database::ephemeral(Variant::Global);
        let err = db
            .transaction(|txn| {
                txn.put_field(Key::new(Scope::Global, Field::Created), 1)?;
                Err::<(), _>(Error::malformed("abort"))
            })
            .unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(db.storage().total_entries(), 0);
    }

    #[test]
    fn test_reads_do_not_bump_version() {
        let db = Database::ephemeral(Variant::PerAccount);
        assert_eq!(db.record(&Scope::account("a")).unwrap(), StateRecord::default());
        assert_eq!(db.version(), 0);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new()
            .variant(Variant::PerAccount)
            .snapshot(dir.path().join("state.snap"));

        {
            let db = Database::open(config.clone()).unwrap();
            db.transaction(|txn| {
                txn.put(&Scope::account("a"), StateRecord::new(Stage::new(3), false))
            })
            .unwrap();
        }

        let db = Database::open(config).unwrap();
        assert_eq!(db.record(&Scope::account("a")).unwrap().stage, Stage::new(3));
        assert_eq!(db.version(), 1);
    }

    #[test]
    fn test_failed_snapshot_write_discards_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.snap");
        let db = Database::open(Config::new().snapshot(&path)).unwrap();
        db.transaction(|txn| txn.put(&Scope::Global, StateRecord::default()))
            .unwrap();

        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        let err = db
            .transaction(|txn| txn.put(&Scope::Global, StateRecord::new(Stage::new(2), false)))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(db.record(&Scope::Global).unwrap(), StateRecord::default());
        assert_eq!(db.version(), 1);

        std::fs::remove_dir(path.with_extension("tmp")).unwrap();
        db.transaction(|txn| txn.put(&Scope::Global, StateRecord::new(Stage::new(2), false)))
            .unwrap();
        drop(db);
        let db = Database::open(Config::new().snapshot(&path)).unwrap();
        assert_eq!(db.record(&Scope::Global).unwrap().stage, Stage::new(2));
        assert_eq!(db.version(), 2);
    }

    #[test]
    fn test_snapshot_variant_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.snap");
        let db = Database::open(Config::new().snapshot(&path)).unwrap();
        db.transaction(|txn| txn.put(&Scope::Global, StateRecord::default()))
            .unwrap();
        drop(db);

        let err = Database::open(Config::new().variant(Variant::PerAccount).snapshot(&path))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
