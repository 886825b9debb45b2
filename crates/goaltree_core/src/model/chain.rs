//! Ownership chain read model.

use crate::model::action::Action;
use crate::model::goal::{Goal, SubGoal};
use crate::model::task::Task;

/// One task together with every ancestor, loaded by a single query.
///
/// The cascade engine only ever walks upward through this value, never
/// through lazy relation lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChain {
    pub task: Task,
    pub action: Action,
    pub sub_goal: SubGoal,
    pub goal: Goal,
}
