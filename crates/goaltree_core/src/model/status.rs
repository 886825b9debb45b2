//! Achievement states for progress-bearing levels.
//!
//! # Invariants
//! - Action and sub-goal levels only use `AchievementStatus`.
//! - Only goals can reach `GoalStatus::Completed`.

use serde::{Deserialize, Serialize};

/// Achievement state for actions and sub-goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    /// Progress is below 100%.
    #[default]
    NotAchieved,
    /// Progress reached 100%.
    Achieved,
}

impl AchievementStatus {
    pub fn is_achieved(self) -> bool {
        matches!(self, Self::Achieved)
    }
}

/// Goal lifecycle state.
///
/// `Completed` is the narrative "done" state other features key off
/// (for example, blocking new task creation under a finished goal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotAchieved,
    /// Accepted when loaded, but never written by the cascade: a goal at
    /// 100 goes straight to `Completed`. Only survives under the sticky
    /// regression policy when it was already stored.
    Achieved,
    Completed,
}

impl GoalStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}
