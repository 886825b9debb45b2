//! Goal tree repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create and load goals, sub-goals, actions and tasks.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Created records always start at progress 0 / not achieved / version 0;
//!   aggregate fields are owned by the cascade engine afterwards.
//! - Parents must exist before children are created (foreign keys).

use crate::model::action::{Action, ActionId};
use crate::model::goal::{Goal, GoalId, SubGoal, SubGoalId};
use crate::model::task::{Task, TaskId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::rows::{
    action_type_to_db, parse_action_row, parse_goal_row, parse_sub_goal_row, parse_task_row,
    task_status_to_db, ACTION_COLUMNS, GOAL_COLUMNS, SUB_GOAL_COLUMNS, TASK_COLUMNS,
};
use rusqlite::{params, Connection};

/// Repository interface for goal tree records.
pub trait GoalTreeRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn create_sub_goal(&self, sub_goal: &SubGoal) -> RepoResult<SubGoalId>;
    fn create_action(&self, action: &Action) -> RepoResult<ActionId>;
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn get_sub_goal(&self, id: SubGoalId) -> RepoResult<Option<SubGoal>>;
    fn get_action(&self, id: ActionId) -> RepoResult<Option<Action>>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Hard-deletes one action together with its tasks.
    fn delete_action(&self, id: ActionId) -> RepoResult<()>;
}

/// SQLite-backed goal tree repository.
pub struct SqliteGoalTreeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalTreeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalTreeRepository for SqliteGoalTreeRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        self.conn.execute(
            "INSERT INTO goals (id, user_id, title) VALUES (?1, ?2, ?3);",
            params![goal.id.to_string(), goal.user_id.to_string(), goal.title.as_str()],
        )?;
        Ok(goal.id)
    }

    fn create_sub_goal(&self, sub_goal: &SubGoal) -> RepoResult<SubGoalId> {
        self.conn.execute(
            "INSERT INTO sub_goals (id, goal_id, title) VALUES (?1, ?2, ?3);",
            params![
                sub_goal.id.to_string(),
                sub_goal.goal_id.to_string(),
                sub_goal.title.as_str()
            ],
        )?;
        Ok(sub_goal.id)
    }

    fn create_action(&self, action: &Action) -> RepoResult<ActionId> {
        self.conn.execute(
            "INSERT INTO actions (id, sub_goal_id, title, type) VALUES (?1, ?2, ?3, ?4);",
            params![
                action.id.to_string(),
                action.sub_goal_id.to_string(),
                action.title.as_str(),
                action_type_to_db(action.kind),
            ],
        )?;
        Ok(action.id)
    }

    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        self.conn.execute(
            "INSERT INTO tasks (id, action_id, title, status) VALUES (?1, ?2, ?3, ?4);",
            params![
                task.id.to_string(),
                task.action_id.to_string(),
                task.title.as_str(),
                task_status_to_db(task.status),
            ],
        )?;
        Ok(task.id)
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goals g WHERE g.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn get_sub_goal(&self, id: SubGoalId) -> RepoResult<Option<SubGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_GOAL_COLUMNS} FROM sub_goals s WHERE s.id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sub_goal_row(row)?));
        }
        Ok(None)
    }

    fn get_action(&self, id: ActionId) -> RepoResult<Option<Action>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACTION_COLUMNS} FROM actions a WHERE a.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_action_row(row)?));
        }
        Ok(None)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn delete_action(&self, id: ActionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM actions WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "action",
                id,
            });
        }
        Ok(())
    }
}
