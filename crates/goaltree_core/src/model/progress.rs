//! Completion percentage value type.
//!
//! # Invariants
//! - A `Progress` value is always an integer in `[0, 100]`.
//! - Every constructor clamps; no code path can build an out-of-range value.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Integer completion percentage shared by actions, sub-goals and goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const FULL: Progress = Progress(100);

    /// Builds a progress value, returning `None` when `value > 100`.
    pub fn new(value: u8) -> Option<Self> {
        if value > 100 {
            return None;
        }
        Some(Self(value))
    }

    /// Builds a progress value from any integer, clamping into `[0, 100]`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns whether this level reached 100%.
    pub fn is_full(self) -> bool {
        self.0 == 100
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Progress::new(value).ok_or_else(|| {
            serde::de::Error::custom(format!("progress must be within 0..=100, got {value}"))
        })
    }
}
