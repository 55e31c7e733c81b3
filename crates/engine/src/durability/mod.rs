//! Durability modes
//!
//! | Mode | Disk files | Survives restart |
//! |------|------------|------------------|
//! | None | None | No |
//! | Snapshot | One snapshot file | Yes |
//!
//! In snapshot mode the database rewrites its snapshot after every commit
//! that changed state. The commit is already visible in memory by then; a
//! failed snapshot write is reported to the caller but does not undo it.
//!
//! ```text
//! transaction():
//!   validate read set
//!        |
//!   allocate version, apply to storage
//!        |
//!   [Snapshot] write tmp file, rename over snapshot
//! ```

use serde::{Deserialize, Serialize};

/// How committed state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurabilityMode {
    /// In-memory only; state is lost when the database is dropped
    #[default]
    None,
    /// Full snapshot rewritten after each state-changing commit
    Snapshot,
}

impl DurabilityMode {
    /// Whether this mode touches disk
    pub fn requires_path(&self) -> bool {
        matches!(self, DurabilityMode::Snapshot)
    }
}
