//! Sharded field storage
//!
//! DashMap keyed by scope, FxHashMap of fields within each scope.
//!
//! # Design
//!
//! - DashMap: sharded by scope, lock-free reads
//! - FxHashMap: O(1) field lookups, fast non-crypto hash
//! - Per-scope: records under different scopes never share a shard entry,
//!   so an operation addressed to one scope cannot observe another's fields

use custody_core::{Field, Key, Result, Scope, Storage, Versioned};
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-scope shard containing the scope's fields
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) data: FxHashMap<Field, Versioned>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of fields in this shard
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Sharded storage - DashMap by scope, HashMap within
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - get(): lock-free read via DashMap
/// - put(): only locks the target scope's shard
///
/// Atomicity across several keys is the transaction manager's job: it
/// serializes [`Storage::apply_batch`] calls under its commit lock.
pub struct ShardedStore {
    shards: DashMap<Scope, Shard>,
    /// Highest applied commit version
    version: AtomicU64,
}

impl ShardedStore {
    /// Create new sharded store
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            version: AtomicU64::new(0),
        }
    }

    /// Rebuild a store from persisted entries
    pub fn from_entries(entries: Vec<(Key, Versioned)>, version: u64) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.put(key, value);
        }
        store.set_version(version);
        store
    }

    /// Get current version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Set version (used when restoring a snapshot)
    pub fn set_version(&self, version: u64) {
        self.version.store(version, Ordering::Release);
    }

    /// Get number of scopes with at least one field
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get total number of fields across all scopes
    pub fn total_entries(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Get a value by key
    #[inline]
    pub fn get(&self, key: &Key) -> Option<Versioned> {
        self.shards
            .get(&key.scope)
            .and_then(|shard| shard.data.get(&key.field).copied())
    }

    /// Put a value for a key
    #[inline]
    pub fn put(&self, key: Key, value: Versioned) {
        self.shards
            .entry(key.scope)
            .or_insert_with(Shard::new)
            .data
            .insert(key.field, value);
    }

    /// Delete a key, returning the removed value if it existed
    ///
    /// A scope whose last field is removed drops its shard.
    pub fn delete(&self, key: &Key) -> Option<Versioned> {
        let removed = self
            .shards
            .get_mut(&key.scope)
            .and_then(|mut shard| shard.data.remove(&key.field));
        self.shards.remove_if(&key.scope, |_, shard| shard.is_empty());
        removed
    }

    /// Check if a scope has a value for `field`
    pub fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// List all fields of one scope, sorted by field
    pub fn list_scope(&self, scope: &Scope) -> Vec<(Field, Versioned)> {
        self.shards
            .get(scope)
            .map(|shard| {
                let mut results: Vec<_> = shard.data.iter().map(|(f, v)| (*f, *v)).collect();
                results.sort_by_key(|(f, _)| *f);
                results
            })
            .unwrap_or_default()
    }

    /// All scopes that hold at least one field, sorted
    pub fn scopes(&self) -> Vec<Scope> {
        let mut scopes: Vec<Scope> = self.shards.iter().map(|e| e.key().clone()).collect();
        scopes.sort();
        scopes
    }

    /// Every stored entry, sorted by key
    pub fn entries(&self) -> Vec<(Key, Versioned)> {
        let mut entries: Vec<(Key, Versioned)> = self
            .shards
            .iter()
            .flat_map(|shard| {
                let scope = shard.key().clone();
                shard
                    .value()
                    .data
                    .iter()
                    .map(|(f, v)| (Key::new(scope.clone(), *f), *v))
                    .collect::<Vec<_>>()
            })
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }
}

impl Storage for ShardedStore {
    fn get(&self, key: &Key) -> Option<Versioned> {
        ShardedStore::get(self, key)
    }

    fn current_version(&self) -> u64 {
        self.version()
    }

    fn apply_batch(&self, writes: &[(Key, u64)], deletes: &[Key], version: u64) -> Result<()> {
        for (key, value) in writes {
            self.put(key.clone(), Versioned::new(*value, version));
        }
        for key in deletes {
            self.delete(key);
        }
        self.version.fetch_max(version, Ordering::AcqRel);
        tracing::trace!(
            version,
            writes = writes.len(),
            deletes = deletes.len(),
            "applied batch"
        );
        Ok(())
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedStore")
            .field("shard_count", &self.shard_count())
            .field("version", &self.version())
            .field("total_entries", &self.total_entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn key(scope: Scope, field: Field) -> Key {
        Key::new(scope, field)
    }

    #[test]
    fn test_put_get() {
        let store = ShardedStore::new();
        let k = key(Scope::Global, Field::Stage);
        store.put(k.clone(), Versioned::new(2, 1));
        assert_eq!(store.get(&k), Some(Versioned::new(2, 1)));
        assert!(store.get(&key(Scope::Global, Field::PaymentReleased)).is_none());
    }

    #[test]
    fn test_scopes_are_isolated() {
        let store = ShardedStore::new();
        let a = key(Scope::account("a"), Field::Stage);
        let b = key(Scope::account("b"), Field::Stage);
        store.put(a.clone(), Versioned::new(3, 1));
        store.put(b.clone(), Versioned::new(1, 1));

        store.delete(&a);
        assert!(store.get(&a).is_none());
        assert_eq!(store.get(&b), Some(Versioned::new(1, 1)));
    }

    #[test]
    fn test_delete_last_field_drops_shard() {
        let store = ShardedStore::new();
        let k = key(Scope::account("a"), Field::OptedIn);
        store.put(k.clone(), Versioned::new(1, 1));
        assert_eq!(store.shard_count(), 1);
        assert_eq!(store.delete(&k), Some(Versioned::new(1, 1)));
        assert_eq!(store.shard_count(), 0);
    }

    #[test]
    fn test_apply_batch_stamps_version() {
        let store = ShardedStore::new();
        let writes = vec![
            (key(Scope::Global, Field::Stage), 4),
            (key(Scope::Global, Field::PaymentReleased), 1),
        ];
        store.apply_batch(&writes, &[], 7).unwrap();
        assert_eq!(store.version(), 7);
        assert_eq!(
            store.list_scope(&Scope::Global),
            vec![
                (Field::Stage, Versioned::new(4, 7)),
                (Field::PaymentReleased, Versioned::new(1, 7)),
            ]
        );
    }

    #[test]
    fn test_entries_roundtrip_through_from_entries() {
        let store = ShardedStore::new();
        store.put(key(Scope::account("b"), Field::Stage), Versioned::new(2, 3));
        store.put(key(Scope::Global, Field::Created), Versioned::new(1, 1));
        let rebuilt = ShardedStore::from_entries(store.entries(), 3);
        assert_eq!(rebuilt.entries(), store.entries());
        assert_eq!(rebuilt.version(), 3);
        assert_eq!(rebuilt.scopes(), vec![Scope::Global, Scope::account("b")]);
    }

    #[test]
    fn test_concurrent_writers_on_distinct_scopes() {
        let store = Arc::new(ShardedStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let scope = Scope::account(format!("acct-{}", i));
                    store.put(Key::new(scope, Field::Stage), Versioned::new(i, 1));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.shard_count(), 8);
        assert_eq!(store.total_entries(), 8);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        fn arb_key() -> impl Strategy<Value = Key> {
            let scope = prop_oneof![
                Just(Scope::Global),
                "[a-c]".prop_map(|s: String| Scope::account(s)),
            ];
            let field = prop_oneof![
                Just(Field::Stage),
                Just(Field::PaymentReleased),
                Just(Field::OptedIn),
            ];
            (scope, field).prop_map(|(s, f)| Key::new(s, f))
        }

        proptest! {
            #[test]
            fn batches_match_ordered_model(
                batches in prop::collection::vec(
                    (prop::collection::vec((arb_key(), 0u64..6), 0..4),
                     prop::collection::vec(arb_key(), 0..2)),
                    1..12,
                )
            ) {
                let store = ShardedStore::new();
                let mut model: BTreeMap<Key, Versioned> = BTreeMap::new();

                for (i, (writes, deletes)) in batches.iter().enumerate() {
                    let version = i as u64 + 1;
                    store.apply_batch(writes, deletes, version).unwrap();
                    for (k, v) in writes {
                        model.insert(k.clone(), Versioned::new(*v, version));
                    }
                    for k in deletes {
                        model.remove(k);
                    }
                    prop_assert_eq!(store.version(), version);
                }

                let expected: Vec<(Key, Versioned)> = model.into_iter().collect();
                prop_assert_eq!(store.entries(), expected);
                prop_assert!(store.scopes().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
