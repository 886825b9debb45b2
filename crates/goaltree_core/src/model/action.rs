//! Action domain model.
//!
//! # Invariants
//! - `progress` and `status` are written by the cascade engine only.
//! - `version` increases by one on every persisted progress write.

use crate::model::goal::SubGoalId;
use crate::model::progress::Progress;
use crate::model::status::AchievementStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable action identifier.
pub type ActionId = Uuid;

/// How an action measures completion from its tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Fraction of tasks completed.
    #[default]
    Execution,
    /// Completion rate measured against the habit continuation target.
    Habit,
}

/// Middle level between sub-goals and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub sub_goal_id: SubGoalId,
    pub title: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub progress: Progress,
    pub status: AchievementStatus,
    pub version: i64,
}

impl Action {
    /// Creates an action at 0% with a generated ID.
    pub fn new(sub_goal_id: SubGoalId, kind: ActionType, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sub_goal_id,
            title: title.into(),
            kind,
            progress: Progress::ZERO,
            status: AchievementStatus::NotAchieved,
            version: 0,
        }
    }
}
