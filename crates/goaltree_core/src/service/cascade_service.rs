//! Cascade coordinator: bottom-up progress propagation for one task change.
//!
//! # Responsibility
//! - Recompute action, sub-goal and goal progress for a changed task.
//! - Apply achievement transitions at every level.
//! - Invalidate cached progress of every touched level after commit.
//!
//! # Invariants
//! - All level writes of one cascade commit together or not at all.
//! - Each level is aggregated from children read inside the same
//!   transaction, so the level below is always seen with its fresh value.
//! - A missing task (or ancestor) is a silent no-op, never an error.
//! - Cache invalidation happens only after commit and never fails a cascade.
//! - The coordinator performs no I/O outside the store and the cache port.

use crate::cache::keys::progress_cache_key;
use crate::cache::CacheStore;
use crate::config::CascadeConfig;
use crate::model::action::Action;
use crate::model::chain::OwnershipChain;
use crate::model::goal::{Goal, SubGoal, UserId};
use crate::model::progress::Progress;
use crate::model::snapshot::ProgressKey;
use crate::model::status::{AchievementStatus, GoalStatus};
use crate::model::task::{TaskId, TaskStatus};
use crate::progress::achievement::{next_achievement_status, next_goal_status, RegressionPolicy};
use crate::progress::calculator::{compute_action_progress, compute_aggregate_progress};
use crate::repo::error::RepoError;
use crate::repo::progress_repo::{ProgressStore, ProgressTx};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Before/after view of one level touched by a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange<S> {
    pub key: ProgressKey,
    pub previous_progress: Progress,
    pub progress: Progress,
    pub previous_status: S,
    pub status: S,
}

impl<S: PartialEq> LevelChange<S> {
    /// Returns whether this level needed a write.
    pub fn changed(&self) -> bool {
        self.previous_progress != self.progress || self.previous_status != self.status
    }
}

/// Result of a cascade that found its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub task_id: TaskId,
    /// Owner of the goal tree, for per-user cache invalidation.
    pub owner_id: UserId,
    pub action: LevelChange<AchievementStatus>,
    pub sub_goal: LevelChange<AchievementStatus>,
    pub goal: LevelChange<GoalStatus>,
    /// Transaction attempts used, including conflict retries.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Task or one of its ancestors does not exist; nothing was written.
    Skipped { task_id: TaskId },
    Applied(CascadeReport),
}

/// Errors surfaced by the cascade engine. Both kinds are retryable by the
/// caller; validation-style failures never originate here.
#[derive(Debug)]
pub enum CascadeError {
    /// A read or write against the store failed; the cascade rolled back.
    Persistence(RepoError),
    /// Concurrent writers kept invalidating the cascade's reads.
    ConcurrencyConflict {
        task_id: TaskId,
        attempts: u32,
        last: RepoError,
    },
}

impl CascadeError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(_) | Self::ConcurrencyConflict { .. } => true,
        }
    }
}

impl Display for CascadeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "progress cascade failed: {err}"),
            Self::ConcurrencyConflict {
                task_id,
                attempts,
                last,
            } => write!(
                f,
                "progress cascade for task {task_id} conflicted {attempts} times: {last}"
            ),
        }
    }
}

impl Error for CascadeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::ConcurrencyConflict { last, .. } => Some(last),
        }
    }
}

struct CascadeLevels {
    owner_id: UserId,
    action: LevelChange<AchievementStatus>,
    sub_goal: LevelChange<AchievementStatus>,
    goal: LevelChange<GoalStatus>,
}

/// Propagates task changes up the goal tree.
pub struct CascadeCoordinator<S: ProgressStore> {
    store: S,
    cache: Arc<dyn CacheStore>,
    config: CascadeConfig,
}

impl<S: ProgressStore> CascadeCoordinator<S> {
    pub fn new(store: S, cache: Arc<dyn CacheStore>, config: CascadeConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Recomputes every ancestor of `task_id` after the caller has already
    /// persisted the task's new status.
    pub fn on_task_status_changed(&self, task_id: TaskId) -> Result<CascadeOutcome, CascadeError> {
        self.run(task_id, None)
    }

    /// Writes the task's new status and cascades it in the same transaction.
    ///
    /// A missing task is skipped like in [`Self::on_task_status_changed`].
    pub fn apply_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<CascadeOutcome, CascadeError> {
        self.run(task_id, Some(status))
    }

    fn run(
        &self,
        task_id: TaskId,
        task_status: Option<TaskStatus>,
    ) -> Result<CascadeOutcome, CascadeError> {
        let started_at = Instant::now();
        let max_attempts = self.config.max_conflict_retries.saturating_add(1);
        let policy = self.config.regression_policy;
        let mut attempt = 0;
        debug!(
            "event=cascade module=cascade status=start task_id={} writes_task_status={}",
            task_id,
            task_status.is_some()
        );

        loop {
            attempt += 1;
            let result = self
                .store
                .in_transaction(|tx| cascade_once(tx, task_id, task_status, policy));

            match result {
                Ok(None) => {
                    debug!(
                        "event=cascade module=cascade status=skipped task_id={} reason=not_found",
                        task_id
                    );
                    return Ok(CascadeOutcome::Skipped { task_id });
                }
                Ok(Some(levels)) => {
                    let report = CascadeReport {
                        task_id,
                        owner_id: levels.owner_id,
                        action: levels.action,
                        sub_goal: levels.sub_goal,
                        goal: levels.goal,
                        attempts: attempt,
                    };
                    self.invalidate_progress(&report);
                    info!(
                        "event=cascade module=cascade status=ok task_id={} action_progress={} sub_goal_progress={} goal_progress={} goal_status={:?} attempts={} duration_ms={}",
                        task_id,
                        report.action.progress.value(),
                        report.sub_goal.progress.value(),
                        report.goal.progress.value(),
                        report.goal.status,
                        attempt,
                        started_at.elapsed().as_millis()
                    );
                    return Ok(CascadeOutcome::Applied(report));
                }
                Err(err) if err.is_contention() && attempt < max_attempts => {
                    warn!(
                        "event=cascade module=cascade status=conflict task_id={} attempt={} error={}",
                        task_id, attempt, err
                    );
                }
                Err(err) if err.is_contention() => {
                    error!(
                        "event=cascade module=cascade status=error error_code=concurrency_conflict task_id={} attempts={} duration_ms={} error={}",
                        task_id,
                        attempt,
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(CascadeError::ConcurrencyConflict {
                        task_id,
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    error!(
                        "event=cascade module=cascade status=error error_code=persistence_failed task_id={} duration_ms={} error={}",
                        task_id,
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(CascadeError::Persistence(err));
                }
            }
        }
    }

    fn invalidate_progress(&self, report: &CascadeReport) {
        for key in [report.action.key, report.sub_goal.key, report.goal.key] {
            let cache_key = progress_cache_key(key);
            if let Err(err) = self.cache.delete(&cache_key) {
                warn!(
                    "event=cache_invalidate module=cascade status=error key={} error={}",
                    cache_key, err
                );
            }
        }
    }
}

fn cascade_once(
    tx: &dyn ProgressTx,
    task_id: TaskId,
    task_status: Option<TaskStatus>,
    policy: RegressionPolicy,
) -> Result<Option<CascadeLevels>, RepoError> {
    let Some(chain) = tx.find_ownership_chain(task_id)? else {
        return Ok(None);
    };
    if let Some(status) = task_status {
        tx.update_task_status(task_id, status)?;
    }
    let OwnershipChain {
        action,
        sub_goal,
        goal,
        ..
    } = chain;
    let owner_id = goal.user_id;

    let tasks = tx.list_tasks_of_action(action.id)?;
    let action_progress = compute_action_progress(&action, &tasks);
    let action = settle_action(tx, action, action_progress, policy)?;

    let actions = tx.list_actions_of_sub_goal(sub_goal.id)?;
    let sub_goal_progress = compute_aggregate_progress(
        &actions.iter().map(|item| item.progress).collect::<Vec<_>>(),
    );
    let sub_goal = settle_sub_goal(tx, sub_goal, sub_goal_progress, policy)?;

    let sub_goals = tx.list_sub_goals_of_goal(goal.id)?;
    let goal_progress = compute_aggregate_progress(
        &sub_goals.iter().map(|item| item.progress).collect::<Vec<_>>(),
    );
    let goal = settle_goal(tx, goal, goal_progress, policy)?;

    Ok(Some(CascadeLevels {
        owner_id,
        action,
        sub_goal,
        goal,
    }))
}

fn settle_action(
    tx: &dyn ProgressTx,
    mut action: Action,
    progress: Progress,
    policy: RegressionPolicy,
) -> Result<LevelChange<AchievementStatus>, RepoError> {
    let change = LevelChange {
        key: ProgressKey::Action(action.id),
        previous_progress: action.progress,
        progress,
        previous_status: action.status,
        status: next_achievement_status(action.status, progress, policy),
    };
    if change.changed() {
        action.progress = change.progress;
        action.status = change.status;
        tx.update_action_progress(&action)?;
    }
    log_level("action", &change);
    Ok(change)
}

fn settle_sub_goal(
    tx: &dyn ProgressTx,
    mut sub_goal: SubGoal,
    progress: Progress,
    policy: RegressionPolicy,
) -> Result<LevelChange<AchievementStatus>, RepoError> {
    let change = LevelChange {
        key: ProgressKey::SubGoal(sub_goal.id),
        previous_progress: sub_goal.progress,
        progress,
        previous_status: sub_goal.status,
        status: next_achievement_status(sub_goal.status, progress, policy),
    };
    if change.changed() {
        sub_goal.progress = change.progress;
        sub_goal.status = change.status;
        tx.update_sub_goal_progress(&sub_goal)?;
    }
    log_level("sub_goal", &change);
    Ok(change)
}

fn settle_goal(
    tx: &dyn ProgressTx,
    mut goal: Goal,
    progress: Progress,
    policy: RegressionPolicy,
) -> Result<LevelChange<GoalStatus>, RepoError> {
    let change = LevelChange {
        key: ProgressKey::Goal(goal.id),
        previous_progress: goal.progress,
        progress,
        previous_status: goal.status,
        status: next_goal_status(goal.status, progress, policy),
    };
    if change.changed() {
        goal.progress = change.progress;
        goal.status = change.status;
        tx.update_goal_progress(&goal)?;
    }
    log_level("goal", &change);
    Ok(change)
}

fn log_level<S: Debug + PartialEq>(level: &str, change: &LevelChange<S>) {
    debug!(
        "event=cascade_level module=cascade level={} key={:?} progress_before={} progress_after={} status_before={:?} status_after={:?} written={}",
        level,
        change.key,
        change.previous_progress.value(),
        change.progress.value(),
        change.previous_status,
        change.status,
        change.changed()
    );
}
