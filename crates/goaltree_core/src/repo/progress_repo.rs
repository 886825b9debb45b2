//! Progress data-access port and SQLite implementation.
//!
//! # Responsibility
//! - Expose the reads and writes a cascade needs as one transactional unit.
//! - Provide committed progress snapshots for read paths.
//!
//! # Invariants
//! - `ProgressStore::in_transaction` commits only when the work closure
//!   returns `Ok`; any error rolls back every write made inside it.
//! - Progress writes are version-guarded: a row whose `version` moved since
//!   it was read is never overwritten.
//! - The SQLite store opens cascade transactions with `BEGIN IMMEDIATE`, so
//!   concurrent cascades never interleave their read-then-write.

use crate::model::action::{Action, ActionId};
use crate::model::chain::OwnershipChain;
use crate::model::goal::{Goal, GoalId, SubGoal, SubGoalId};
use crate::model::progress::Progress;
use crate::model::snapshot::{ProgressKey, ProgressSnapshot};
use crate::model::status::{AchievementStatus, GoalStatus};
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::rows::{
    achievement_status_to_db, goal_status_to_db, parse_achievement_status, parse_action_row,
    parse_goal_row, parse_goal_status, parse_progress_column, parse_sub_goal_row, parse_task_row,
    task_status_to_db, ACTION_COLUMNS, GOAL_COLUMNS, SUB_GOAL_COLUMNS, TASK_COLUMNS,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Operations available inside one cascade transaction.
pub trait ProgressTx {
    /// Loads a task with its action, sub-goal and goal in one query.
    fn find_ownership_chain(&self, task_id: TaskId) -> RepoResult<Option<OwnershipChain>>;
    fn find_task(&self, task_id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists every task owned by `action_id`, in creation order.
    fn list_tasks_of_action(&self, action_id: ActionId) -> RepoResult<Vec<Task>>;
    /// Lists every action owned by `sub_goal_id`, in creation order.
    fn list_actions_of_sub_goal(&self, sub_goal_id: SubGoalId) -> RepoResult<Vec<Action>>;
    /// Lists every sub-goal owned by `goal_id`, in creation order.
    fn list_sub_goals_of_goal(&self, goal_id: GoalId) -> RepoResult<Vec<SubGoal>>;
    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepoResult<()>;
    /// Writes `progress` and `status`, expecting the stored version to equal
    /// `action.version`. Returns the new version.
    fn update_action_progress(&self, action: &Action) -> RepoResult<i64>;
    /// Same contract as [`ProgressTx::update_action_progress`].
    fn update_sub_goal_progress(&self, sub_goal: &SubGoal) -> RepoResult<i64>;
    /// Same contract as [`ProgressTx::update_action_progress`].
    fn update_goal_progress(&self, goal: &Goal) -> RepoResult<i64>;
}

/// Transactional entry point of the progress data-access port.
pub trait ProgressStore {
    /// Runs `work` as one atomic unit.
    fn in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&dyn ProgressTx) -> RepoResult<T>;
}

/// Read-side port returning committed aggregate progress.
pub trait ProgressReader {
    fn read_progress(&self, key: ProgressKey) -> RepoResult<Option<ProgressSnapshot>>;
}

/// SQLite-backed progress store.
pub struct SqliteProgressStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProgressStore for SqliteProgressStore<'_> {
    fn in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&dyn ProgressTx) -> RepoResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = work(&SqliteProgressTx { conn: &tx })?;
        tx.commit()?;
        Ok(value)
    }
}

impl ProgressReader for SqliteProgressStore<'_> {
    fn read_progress(&self, key: ProgressKey) -> RepoResult<Option<ProgressSnapshot>> {
        let (table, id) = match key {
            ProgressKey::Action(id) => ("actions", id),
            ProgressKey::SubGoal(id) => ("sub_goals", id),
            ProgressKey::Goal(id) => ("goals", id),
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT progress, status, version
             FROM {table}
             WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let progress = parse_progress_column(row, "progress", table)?;
        let status_text: String = row.get("status")?;
        let achieved = match key {
            ProgressKey::Goal(_) => {
                parse_goal_status(&status_text).map(|status| status != GoalStatus::NotAchieved)
            }
            ProgressKey::Action(_) | ProgressKey::SubGoal(_) => {
                parse_achievement_status(&status_text).map(AchievementStatus::is_achieved)
            }
        }
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{status_text}` in {table}.status"))
        })?;

        Ok(Some(ProgressSnapshot {
            key,
            progress,
            achieved,
            version: row.get("version")?,
        }))
    }
}

struct SqliteProgressTx<'a> {
    conn: &'a Connection,
}

impl ProgressTx for SqliteProgressTx<'_> {
    fn find_ownership_chain(&self, task_id: TaskId) -> RepoResult<Option<OwnershipChain>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {TASK_COLUMNS},
                {ACTION_COLUMNS},
                {SUB_GOAL_COLUMNS},
                {GOAL_COLUMNS}
             FROM tasks t
             INNER JOIN actions a ON a.id = t.action_id
             INNER JOIN sub_goals s ON s.id = a.sub_goal_id
             INNER JOIN goals g ON g.id = s.goal_id
             WHERE t.id = ?1;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(OwnershipChain {
                task: parse_task_row(row)?,
                action: parse_action_row(row)?,
                sub_goal: parse_sub_goal_row(row)?,
                goal: parse_goal_row(row)?,
            }));
        }
        Ok(None)
    }

    fn find_task(&self, task_id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks t
             WHERE t.id = ?1;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks_of_action(&self, action_id: ActionId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks t
             WHERE t.action_id = ?1
             ORDER BY t.rowid ASC;"
        ))?;
        let mut rows = stmt.query([action_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn list_actions_of_sub_goal(&self, sub_goal_id: SubGoalId) -> RepoResult<Vec<Action>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTION_COLUMNS}
             FROM actions a
             WHERE a.sub_goal_id = ?1
             ORDER BY a.rowid ASC;"
        ))?;
        let mut rows = stmt.query([sub_goal_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_action_row(row)?);
        }
        Ok(items)
    }

    fn list_sub_goals_of_goal(&self, goal_id: GoalId) -> RepoResult<Vec<SubGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_GOAL_COLUMNS}
             FROM sub_goals s
             WHERE s.goal_id = ?1
             ORDER BY s.rowid ASC;"
        ))?;
        let mut rows = stmt.query([goal_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_sub_goal_row(row)?);
        }
        Ok(items)
    }

    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![task_id.to_string(), task_status_to_db(status)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task_id,
            });
        }
        Ok(())
    }

    fn update_action_progress(&self, action: &Action) -> RepoResult<i64> {
        guarded_progress_update(
            self.conn,
            GuardedTable::ACTIONS,
            action.id,
            action.progress,
            achievement_status_to_db(action.status),
            action.version,
        )
    }

    fn update_sub_goal_progress(&self, sub_goal: &SubGoal) -> RepoResult<i64> {
        guarded_progress_update(
            self.conn,
            GuardedTable::SUB_GOALS,
            sub_goal.id,
            sub_goal.progress,
            achievement_status_to_db(sub_goal.status),
            sub_goal.version,
        )
    }

    fn update_goal_progress(&self, goal: &Goal) -> RepoResult<i64> {
        guarded_progress_update(
            self.conn,
            GuardedTable::GOALS,
            goal.id,
            goal.progress,
            goal_status_to_db(goal.status),
            goal.version,
        )
    }
}

#[derive(Clone, Copy)]
struct GuardedTable {
    table: &'static str,
    entity: &'static str,
}

impl GuardedTable {
    const ACTIONS: Self = Self {
        table: "actions",
        entity: "action",
    };
    const SUB_GOALS: Self = Self {
        table: "sub_goals",
        entity: "sub_goal",
    };
    const GOALS: Self = Self {
        table: "goals",
        entity: "goal",
    };
}

fn guarded_progress_update(
    conn: &Connection,
    target: GuardedTable,
    id: Uuid,
    progress: Progress,
    status: &'static str,
    expected_version: i64,
) -> RepoResult<i64> {
    let table = target.table;
    let changed = conn.execute(
        &format!(
            "UPDATE {table}
             SET progress = ?2,
                 status = ?3,
                 version = version + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND version = ?4;"
        ),
        params![
            id.to_string(),
            i64::from(progress.value()),
            status,
            expected_version
        ],
    )?;
    if changed == 1 {
        return Ok(expected_version + 1);
    }

    let current: Option<i64> = conn
        .query_row(
            &format!("SELECT version FROM {table} WHERE id = ?1;"),
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match current {
        None => Err(RepoError::NotFound {
            entity: target.entity,
            id,
        }),
        Some(_) => Err(RepoError::VersionConflict {
            entity: target.entity,
            id,
            expected_version,
        }),
    }
}
