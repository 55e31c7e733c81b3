//! Storage seams
//!
//! [`Storage`] is the committed, versioned field store that transactions
//! validate against and apply to. [`StateStore`] is the record-level view an
//! invocation works through; its reads and writes belong to the enclosing
//! transaction and become visible only when that transaction commits.

use crate::error::Result;
use crate::record::StateRecord;
use crate::types::{Key, Scope, Versioned};

/// Committed field storage
///
/// Implementations must be safe to share across threads. Writes arrive only
/// through [`Storage::apply_batch`], once a transaction has been validated.
pub trait Storage: Send + Sync {
    /// Read the committed value of a key
    fn get(&self, key: &Key) -> Option<Versioned>;

    /// Highest commit version applied so far
    fn current_version(&self) -> u64;

    /// Apply a validated write set, stamping every write with `version`
    fn apply_batch(&self, writes: &[(Key, u64)], deletes: &[Key], version: u64) -> Result<()>;
}

/// Record-level access within one invocation
pub trait StateStore {
    /// Read the record for `scope`, or the default record if none exists
    fn get(&mut self, scope: &Scope) -> Result<StateRecord>;

    /// Replace the record for `scope`
    fn put(&mut self, scope: &Scope, record: StateRecord) -> Result<()>;
}
