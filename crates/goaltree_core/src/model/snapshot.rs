//! Read model for one level's aggregate progress.

use crate::model::action::ActionId;
use crate::model::goal::{GoalId, SubGoalId};
use crate::model::progress::Progress;
use serde::{Deserialize, Serialize};

/// Addresses one progress-bearing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "id", rename_all = "snake_case")]
pub enum ProgressKey {
    Action(ActionId),
    SubGoal(SubGoalId),
    Goal(GoalId),
}

/// Aggregate progress of one entity as last committed by a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub key: ProgressKey,
    pub progress: Progress,
    /// `Achieved` for actions/sub-goals; `Achieved` or `Completed` for goals.
    pub achieved: bool,
    pub version: i64,
}
