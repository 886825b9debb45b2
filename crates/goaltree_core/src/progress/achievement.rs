//! Achievement state transitions driven by freshly computed progress.
//!
//! # Invariants
//! - Transitions are pure functions of `(previous, progress, policy)`.
//! - Under `RegressionPolicy::Reevaluate`, achieved/completed holds iff
//!   progress is 100.
//! - Under `RegressionPolicy::Sticky`, achieved/completed states are never
//!   left once reached.

use crate::model::progress::Progress;
use crate::model::status::{AchievementStatus, GoalStatus};
use serde::{Deserialize, Serialize};

/// What happens to an achieved level whose progress falls below 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionPolicy {
    /// Status is recomputed from the new percentage on every cascade.
    #[default]
    Reevaluate,
    /// Achievement is one-way; reverting a task keeps the achieved state.
    Sticky,
}

/// Next status for an action or sub-goal.
pub fn next_achievement_status(
    previous: AchievementStatus,
    progress: Progress,
    policy: RegressionPolicy,
) -> AchievementStatus {
    if progress.is_full() {
        return AchievementStatus::Achieved;
    }
    match (policy, previous) {
        (RegressionPolicy::Sticky, AchievementStatus::Achieved) => AchievementStatus::Achieved,
        _ => AchievementStatus::NotAchieved,
    }
}

/// Next status for a goal.
///
/// A goal at 100 lands on `Completed` in one step; `Achieved` is never
/// produced from `NotAchieved`.
pub fn next_goal_status(
    previous: GoalStatus,
    progress: Progress,
    policy: RegressionPolicy,
) -> GoalStatus {
    if progress.is_full() {
        return GoalStatus::Completed;
    }
    match (policy, previous) {
        (RegressionPolicy::Sticky, GoalStatus::Completed | GoalStatus::Achieved) => previous,
        _ => GoalStatus::NotAchieved,
    }
}

#[cfg(test)]
mod tests {
    use super::{next_achievement_status, next_goal_status, RegressionPolicy};
    use crate::model::progress::Progress;
    use crate::model::status::{AchievementStatus, GoalStatus};

    fn pct(value: u8) -> Progress {
        Progress::new(value).expect("test values are in range")
    }

    #[test]
    fn full_progress_achieves_under_both_policies() {
        for policy in [RegressionPolicy::Reevaluate, RegressionPolicy::Sticky] {
            assert_eq!(
                next_achievement_status(AchievementStatus::NotAchieved, Progress::FULL, policy),
                AchievementStatus::Achieved
            );
            assert_eq!(
                next_goal_status(GoalStatus::NotAchieved, Progress::FULL, policy),
                GoalStatus::Completed
            );
        }
    }

    #[test]
    fn reevaluate_regresses_when_progress_drops() {
        assert_eq!(
            next_achievement_status(
                AchievementStatus::Achieved,
                pct(75),
                RegressionPolicy::Reevaluate
            ),
            AchievementStatus::NotAchieved
        );
        assert_eq!(
            next_goal_status(GoalStatus::Completed, pct(99), RegressionPolicy::Reevaluate),
            GoalStatus::NotAchieved
        );
    }

    #[test]
    fn sticky_keeps_reached_states() {
        assert_eq!(
            next_achievement_status(AchievementStatus::Achieved, pct(10), RegressionPolicy::Sticky),
            AchievementStatus::Achieved
        );
        assert_eq!(
            next_goal_status(GoalStatus::Completed, pct(10), RegressionPolicy::Sticky),
            GoalStatus::Completed
        );
    }

    #[test]
    fn partial_progress_never_achieves() {
        for policy in [RegressionPolicy::Reevaluate, RegressionPolicy::Sticky] {
            assert_eq!(
                next_achievement_status(AchievementStatus::NotAchieved, pct(99), policy),
                AchievementStatus::NotAchieved
            );
            assert_eq!(
                next_goal_status(GoalStatus::NotAchieved, pct(0), policy),
                GoalStatus::NotAchieved
            );
        }
    }

    #[test]
    fn goal_status_never_lands_on_achieved_from_not_achieved() {
        for policy in [RegressionPolicy::Reevaluate, RegressionPolicy::Sticky] {
            for value in 0..=100 {
                let next = next_goal_status(GoalStatus::NotAchieved, pct(value), policy);
                assert_ne!(next, GoalStatus::Achieved, "progress {value}");
            }
        }
    }
}
