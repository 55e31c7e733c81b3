//! Database configuration
//!
//! Configuration can be built in code or read from TOML:
//!
//! ```toml
//! variant = "per-account"
//! durability = "snapshot"
//! path = "/var/lib/custody/state.snap"
//! ```
//!
//! Every key is optional. The defaults give an in-memory database running
//! the global variant.

use std::fs;
use std::path::{Path, PathBuf};

use custody_core::{Error, Result, Variant};
use serde::{Deserialize, Serialize};

use crate::durability::DurabilityMode;

/// Configuration for opening a [`Database`](crate::Database)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Workflow variant
    pub variant: Variant,
    /// Persistence mode
    pub durability: DurabilityMode,
    /// Snapshot file, required for snapshot durability
    pub path: Option<PathBuf>,
}

impl Config {
    /// Default configuration: in-memory, global variant
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(s).map_err(|e| Error::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the workflow variant
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Persist to a snapshot file at `path`
    pub fn snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.durability = DurabilityMode::Snapshot;
        self.path = Some(path.into());
        self
    }

    /// Keep state in memory only
    pub fn ephemeral(mut self) -> Self {
        self.durability = DurabilityMode::None;
        self.path = None;
        self
    }

    /// Check that the settings are consistent
    pub fn validate(&self) -> Result<()> {
        if self.durability.requires_path() && self.path.is_none() {
            return Err(Error::Config(
                "snapshot durability requires a path".into(),
            ));
        }
        Ok(())
    }
}
