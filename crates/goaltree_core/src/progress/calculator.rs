//! Pure progress aggregation rules.
//!
//! # Responsibility
//! - Compute one level's completion percentage from its direct children.
//!
//! # Invariants
//! - Functions are total and deterministic; they never panic and never do I/O.
//! - Results are always within `[0, 100]`.
//! - Rounding is half-up on the final percentage, computed with integer
//!   arithmetic so ratios such as 8/10 against an 80% target land exactly.

use crate::model::action::{Action, ActionType};
use crate::model::progress::Progress;
use crate::model::task::Task;

/// Completion rate at which a habit action counts as fully achieved.
pub const HABIT_TARGET_RATE_PERCENT: u64 = 80;

/// Computes an action's progress from all of its tasks.
///
/// - No tasks: 0.
/// - `Execution`: `round(completed / total * 100)`.
/// - `Habit`: `min(round(completed / total / 0.8 * 100), 100)`.
///
/// Only `TaskStatus::Completed` counts as completed; skipped tasks still count
/// toward the total.
pub fn compute_action_progress(action: &Action, tasks: &[Task]) -> Progress {
    compute_task_progress(action.kind, tasks)
}

/// Same as [`compute_action_progress`] when only the action type is at hand.
pub fn compute_task_progress(kind: ActionType, tasks: &[Task]) -> Progress {
    let total = tasks.len() as u64;
    if total == 0 {
        return Progress::ZERO;
    }
    let completed = tasks.iter().filter(|task| task.is_completed()).count() as u64;

    let percent = match kind {
        ActionType::Execution => round_half_up(completed * 100, total),
        ActionType::Habit => {
            round_half_up(completed * 100 * 100, total * HABIT_TARGET_RATE_PERCENT)
        }
    };
    Progress::clamped(percent.min(100) as i64)
}

/// Unweighted arithmetic mean of child progress values, rounded half-up.
///
/// Used for sub-goals (from actions) and goals (from sub-goals). Each child
/// weighs the same regardless of how many tasks back it. Empty input yields 0.
pub fn compute_aggregate_progress(children: &[Progress]) -> Progress {
    if children.is_empty() {
        return Progress::ZERO;
    }
    let sum: u64 = children.iter().map(|child| u64::from(child.value())).sum();
    let mean = round_half_up(sum, children.len() as u64);
    Progress::clamped(mean.min(100) as i64)
}

fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}
