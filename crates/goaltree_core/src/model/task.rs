//! Task domain model.
//!
//! # Responsibility
//! - Define the leaf unit of work whose status drives every cascade.
//!
//! # Invariants
//! - A task is owned by exactly one action for its whole lifetime.
//! - Only `status` changes after creation.

use crate::model::action::ActionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    NotStarted,
    /// Work is in progress.
    InProgress,
    /// Done; the only status counted as completed by progress math.
    Completed,
    /// Deliberately skipped. Still counts toward the task total.
    Skipped,
}

/// Leaf record of the goal hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub action_id: ActionId,
    pub title: String,
    pub status: TaskStatus,
}

impl Task {
    /// Creates a not-started task under `action_id` with a generated ID.
    pub fn new(action_id: ActionId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_id,
            title: title.into(),
            status: TaskStatus::NotStarted,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
