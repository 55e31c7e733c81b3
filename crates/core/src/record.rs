//! The persisted workflow record

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::stage::Stage;
use crate::types::Field;

/// Persisted (stage, release flag) pair for one scope
///
/// A record that has never been written reads as [`StateRecord::default`]:
/// the initial stage with the flag cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRecord {
    /// Current workflow stage
    #[serde(rename = "Stage")]
    pub stage: Stage,
    /// Whether payment release has been signalled
    #[serde(rename = "PaymentReleased")]
    pub payment_released: bool,
}

impl StateRecord {
    /// Create a record
    pub fn new(stage: impl Into<Stage>, payment_released: bool) -> Self {
        StateRecord {
            stage: stage.into(),
            payment_released,
        }
    }

    /// The record's fields as stored (booleans as 0/1)
    pub fn to_fields(&self) -> [(Field, u64); 2] {
        [
            (Field::Stage, self.stage.value()),
            (Field::PaymentReleased, u64::from(self.payment_released)),
        ]
    }

    /// Rebuild a record from stored field values
    ///
    /// Absent fields take their default. Stage 0 and flag values other than
    /// 0 or 1 cannot have been written by a valid transition and are
    /// reported as corruption.
    pub fn from_fields(stage: Option<u64>, payment_released: Option<u64>) -> Result<Self> {
        let stage = match stage {
            None => Stage::INITIAL,
            Some(0) => return Err(Error::Corruption("stored stage is 0".into())),
            Some(s) => Stage::new(s),
        };
        let payment_released = match payment_released {
            None | Some(0) => false,
            Some(1) => true,
            Some(other) => {
                return Err(Error::Corruption(format!(
                    "stored PaymentReleased is {}, expected 0 or 1",
                    other
                )))
            }
        };
        Ok(StateRecord {
            stage,
            payment_released,
        })
    }
}

impl Default for StateRecord {
    fn default() -> Self {
        StateRecord {
            stage: Stage::INITIAL,
            payment_released: false,
        }
    }
}

impl fmt::Display for StateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Stage: {}, PaymentReleased: {}}}",
            self.stage, self.payment_released
        )
    }
}
