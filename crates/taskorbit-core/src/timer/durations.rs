use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Interval lengths used by the session engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDurations")]
pub struct SessionDurations {
    focus_secs: u64,
    break_secs: u64,
}

/// Unchecked wire form; every deserialized value goes through `new`.
#[derive(Deserialize)]
struct RawDurations {
    focus_secs: u64,
    break_secs: u64,
}

impl TryFrom<RawDurations> for SessionDurations {
    type Error = ValidationError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        Self::new(raw.focus_secs, raw.break_secs)
    }
}

impl SessionDurations {
    pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
    pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;

    /// Both intervals must be at least one second long.
    pub fn new(focus_secs: u64, break_secs: u64) -> Result<Self, ValidationError> {
        for (field, value) in [("focus_secs", focus_secs), ("break_secs", break_secs)] {
            if value == 0 {
                return Err(ValidationError::OutOfRange {
                    field,
                    min: 1,
                    max: i64::MAX,
                    value: 0,
                });
            }
        }
        Ok(Self {
            focus_secs,
            break_secs,
        })
    }

    /// Build from whole minutes.
    ///
    /// Uses saturating arithmetic so absurd values cannot overflow.
    pub fn from_minutes(focus_min: u32, break_min: u32) -> Result<Self, ValidationError> {
        Self::new(
            (focus_min as u64).saturating_mul(60),
            (break_min as u64).saturating_mul(60),
        )
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            focus_secs: Self::DEFAULT_FOCUS_SECS,
            break_secs: Self::DEFAULT_BREAK_SECS,
        }
    }
}
