//! Goal and sub-goal domain models.
//!
//! # Invariants
//! - Every sub-goal belongs to exactly one goal.
//! - Aggregate fields (`progress`, `status`, `version`) are cascade-owned.

use crate::model::progress::Progress;
use crate::model::status::{AchievementStatus, GoalStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GoalId = Uuid;
pub type SubGoalId = Uuid;
/// Owner of a goal tree. Used for per-user list cache keys.
pub type UserId = Uuid;

/// Root of one goal hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub title: String,
    pub progress: Progress,
    pub status: GoalStatus,
    pub version: i64,
}

impl Goal {
    pub fn new(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            progress: Progress::ZERO,
            status: GoalStatus::NotAchieved,
            version: 0,
        }
    }
}

/// Intermediate level aggregating actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGoal {
    pub id: SubGoalId,
    pub goal_id: GoalId,
    pub title: String,
    pub progress: Progress,
    pub status: AchievementStatus,
    pub version: i64,
}

impl SubGoal {
    pub fn new(goal_id: GoalId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            title: title.into(),
            progress: Progress::ZERO,
            status: AchievementStatus::NotAchieved,
            version: 0,
        }
    }
}
