//! Core types for the custody store
//!
//! This module defines the identifiers used to address persisted state:
//! - [`AccountId`]: identity of a participating account
//! - [`Scope`]: the key under which exactly one state record lives
//! - [`Field`]: the named fields persisted per scope
//! - [`Key`]: a (scope, field) pair, the unit of storage

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a participating account
///
/// Accounts are the senders of invocations. Under the per-account variant
/// they also key the workflow state.
///
/// # Examples
///
/// ```
/// use custody_core::AccountId;
///
/// let buyer = AccountId::new("buyer");
/// assert_eq!(buyer.as_str(), "buyer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account identity from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        AccountId(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage scope for a state record
///
/// The global variant keeps one process-wide record; the per-account variant
/// keeps one record per participating account. Scopes never share fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// The single process-wide scope
    Global,
    /// A scope owned by one account
    Account(AccountId),
}

impl Scope {
    /// Shorthand for `Scope::Account`
    pub fn account(id: impl Into<AccountId>) -> Self {
        Scope::Account(id.into())
    }

    /// The owning account, if this is an account scope
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            Scope::Global => None,
            Scope::Account(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Account(id) => write!(f, "account:{}", id),
        }
    }
}

/// Named field persisted under a scope
///
/// `Stage` and `PaymentReleased` make up the workflow record. `Created` and
/// `OptedIn` are lifecycle bookkeeping. All fields hold unsigned integers;
/// booleans are stored as 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Current workflow stage
    Stage,
    /// Payment-release intent flag
    PaymentReleased,
    /// Set once the application has been created (global scope only)
    Created,
    /// Set while an account is registered with the application
    OptedIn,
}

impl Field {
    /// The persisted key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Stage => "Stage",
            Field::PaymentReleased => "PaymentReleased",
            Field::Created => "Created",
            Field::OptedIn => "OptedIn",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key: a field within a scope
///
/// Keys order by scope first, then field, so listing a store yields each
/// scope's fields together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Owning scope
    pub scope: Scope,
    /// Field within the scope
    pub field: Field,
}

impl Key {
    /// Create a key for `field` under `scope`
    pub fn new(scope: Scope, field: Field) -> Self {
        Key { scope, field }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.field)
    }
}

/// A stored value together with the commit version that wrote it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned {
    /// Field value (booleans as 0/1)
    pub value: u64,
    /// Commit version of the write
    pub version: u64,
}

impl Versioned {
    /// Create a versioned value
    pub fn new(value: u64, version: u64) -> Self {
        Versioned { value, version }
    }
}
