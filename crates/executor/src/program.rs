//! Deployable program artifacts
//!
//! A variant compiles to two documents. The approval program describes
//! everything the executor enforces: key layout, stage sequence, transition
//! table and lifecycle policy. The clear program is the teardown handler,
//! which acknowledges unconditionally.
//!
//! ```text
//! <dir>/approval.json
//! <dir>/clear.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use custody_core::{Action, Error, Field, Result, Stage, StateRecord, TransitionRule, Variant};
use serde::Serialize;
use tracing::info;

use crate::gate::{LifecycleGate, Policy};

/// Artifact format version
pub const PROGRAM_FORMAT_VERSION: u32 = 1;

/// File name of the approval artifact
pub const APPROVAL_FILE: &str = "approval.json";

/// File name of the clear artifact
pub const CLEAR_FILE: &str = "clear.json";

/// A named stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageEntry {
    /// Stage number
    pub value: Stage,
    /// Stage name
    pub name: &'static str,
}

/// A lifecycle policy row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEntry {
    /// Lifecycle action
    pub action: Action,
    /// Its fixed policy
    pub policy: Policy,
}

/// Everything the approval path enforces for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalProgram {
    /// Artifact format version
    pub format_version: u32,
    /// Variant compiled
    pub variant: Variant,
    /// Keys stored once for the whole application
    pub global_keys: Vec<Field>,
    /// Keys stored per account
    pub local_keys: Vec<Field>,
    /// Stage sequence in order
    pub stages: Vec<StageEntry>,
    /// Record written on create and on reset
    pub initial: StateRecord,
    /// Legal transitions; `Reset` is accepted from every stage
    pub transitions: Vec<TransitionRule>,
    /// Whether workflow calls require a registered sender
    pub requires_registration: bool,
    /// Lifecycle policy table
    pub lifecycle: Vec<LifecycleEntry>,
}

/// Teardown handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearProgram {
    /// Artifact format version
    pub format_version: u32,
    /// Always true
    pub accept: bool,
}

/// Both artifacts for one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Approval artifact
    pub approval: ApprovalProgram,
    /// Clear artifact
    pub clear: ClearProgram,
}

impl Program {
    /// Compile `variant`
    pub fn compile(variant: Variant) -> Self {
        let (global_keys, local_keys) = match variant {
            Variant::Global => (
                vec![Field::Created, Field::Stage, Field::PaymentReleased],
                vec![],
            ),
            Variant::PerAccount => (
                vec![Field::Created],
                vec![Field::Stage, Field::PaymentReleased, Field::OptedIn],
            ),
        };

        let stages = variant
            .stages()
            .filter_map(|stage| {
                variant
                    .stage_name(stage)
                    .map(|name| StageEntry { value: stage, name })
            })
            .collect();

        let lifecycle = LifecycleGate::policy_table()
            .iter()
            .map(|(action, policy)| LifecycleEntry {
                action: *action,
                policy: *policy,
            })
            .collect();

        Program {
            approval: ApprovalProgram {
                format_version: PROGRAM_FORMAT_VERSION,
                variant,
                global_keys,
                local_keys,
                stages,
                initial: StateRecord::new(variant.initial_stage(), false),
                transitions: variant.rules().to_vec(),
                requires_registration: variant == Variant::PerAccount,
                lifecycle,
            },
            clear: ClearProgram {
                format_version: PROGRAM_FORMAT_VERSION,
                accept: true,
            },
        }
    }

    /// Approval artifact as pretty JSON
    pub fn approval_json(&self) -> Result<String> {
        to_json(&self.approval)
    }

    /// Clear artifact as pretty JSON
    pub fn clear_json(&self) -> Result<String> {
        to_json(&self.clear)
    }

    /// Write both artifacts into `dir`, creating it if needed
    ///
    /// Returns the written paths, approval first.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let approval = dir.join(APPROVAL_FILE);
        let clear = dir.join(CLEAR_FILE);
        fs::write(&approval, self.approval_json()?)?;
        fs::write(&clear, self.clear_json()?)?;

        info!(
            variant = %self.approval.variant,
            dir = %dir.display(),
            "wrote program artifacts"
        );
        Ok(vec![approval, clear])
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))
}
