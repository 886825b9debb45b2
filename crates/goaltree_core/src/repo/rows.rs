//! Column lists, row parsers and enum codecs for goal tree tables.
//!
//! Each entity is selected through an aliased column list (`t.`, `a.`, `s.`,
//! `g.`) with entity-prefixed names, so single-table reads and the ownership
//! chain JOIN share one parser per entity.

use crate::model::action::{Action, ActionType};
use crate::model::goal::{Goal, SubGoal};
use crate::model::progress::Progress;
use crate::model::status::{AchievementStatus, GoalStatus};
use crate::model::task::{Task, TaskStatus};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Row;
use uuid::Uuid;

pub(crate) const TASK_COLUMNS: &str = "t.id AS task_id,
    t.action_id AS task_action_id,
    t.title AS task_title,
    t.status AS task_status";

pub(crate) const ACTION_COLUMNS: &str = "a.id AS action_id,
    a.sub_goal_id AS action_sub_goal_id,
    a.title AS action_title,
    a.type AS action_type,
    a.progress AS action_progress,
    a.status AS action_status,
    a.version AS action_version";

pub(crate) const SUB_GOAL_COLUMNS: &str = "s.id AS sub_goal_id,
    s.goal_id AS sub_goal_goal_id,
    s.title AS sub_goal_title,
    s.progress AS sub_goal_progress,
    s.status AS sub_goal_status,
    s.version AS sub_goal_version";

pub(crate) const GOAL_COLUMNS: &str = "g.id AS goal_id,
    g.user_id AS goal_user_id,
    g.title AS goal_title,
    g.progress AS goal_progress,
    g.status AS goal_status,
    g.version AS goal_version";

pub(crate) fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("task_status")?;
    let status = parse_task_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    Ok(Task {
        id: parse_uuid_column(row, "task_id", "tasks.id")?,
        action_id: parse_uuid_column(row, "task_action_id", "tasks.action_id")?,
        title: row.get("task_title")?,
        status,
    })
}

pub(crate) fn parse_action_row(row: &Row<'_>) -> RepoResult<Action> {
    let type_text: String = row.get("action_type")?;
    let kind = parse_action_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action type `{type_text}` in actions.type"))
    })?;

    Ok(Action {
        id: parse_uuid_column(row, "action_id", "actions.id")?,
        sub_goal_id: parse_uuid_column(row, "action_sub_goal_id", "actions.sub_goal_id")?,
        title: row.get("action_title")?,
        kind,
        progress: parse_progress_column(row, "action_progress", "actions.progress")?,
        status: parse_achievement_column(row, "action_status", "actions.status")?,
        version: row.get("action_version")?,
    })
}

pub(crate) fn parse_sub_goal_row(row: &Row<'_>) -> RepoResult<SubGoal> {
    Ok(SubGoal {
        id: parse_uuid_column(row, "sub_goal_id", "sub_goals.id")?,
        goal_id: parse_uuid_column(row, "sub_goal_goal_id", "sub_goals.goal_id")?,
        title: row.get("sub_goal_title")?,
        progress: parse_progress_column(row, "sub_goal_progress", "sub_goals.progress")?,
        status: parse_achievement_column(row, "sub_goal_status", "sub_goals.status")?,
        version: row.get("sub_goal_version")?,
    })
}

pub(crate) fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let status_text: String = row.get("goal_status")?;
    let status = parse_goal_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid goal status `{status_text}` in goals.status"))
    })?;

    Ok(Goal {
        id: parse_uuid_column(row, "goal_id", "goals.id")?,
        user_id: parse_uuid_column(row, "goal_user_id", "goals.user_id")?,
        title: row.get("goal_title")?,
        progress: parse_progress_column(row, "goal_progress", "goals.progress")?,
        status,
        version: row.get("goal_version")?,
    })
}

fn parse_uuid_column(row: &Row<'_>, alias: &str, column: &'static str) -> RepoResult<Uuid> {
    let value: String = row.get(alias)?;
    Uuid::parse_str(&value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_progress_column(
    row: &Row<'_>,
    alias: &str,
    column: &str,
) -> RepoResult<Progress> {
    let value: i64 = row.get(alias)?;
    u8::try_from(value)
        .ok()
        .and_then(Progress::new)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid progress `{value}` in {column}")))
}

fn parse_achievement_column(
    row: &Row<'_>,
    alias: &str,
    column: &'static str,
) -> RepoResult<AchievementStatus> {
    let value: String = row.get(alias)?;
    parse_achievement_status(&value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in {column}")))
}

pub(crate) fn task_status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "not_started",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Skipped => "skipped",
    }
}

fn parse_task_status(value: &str) -> Option<TaskStatus> {
    match value {
        "not_started" => Some(TaskStatus::NotStarted),
        "in_progress" => Some(TaskStatus::InProgress),
        "completed" => Some(TaskStatus::Completed),
        "skipped" => Some(TaskStatus::Skipped),
        _ => None,
    }
}

pub(crate) fn action_type_to_db(kind: ActionType) -> &'static str {
    match kind {
        ActionType::Execution => "execution",
        ActionType::Habit => "habit",
    }
}

fn parse_action_type(value: &str) -> Option<ActionType> {
    match value {
        "execution" => Some(ActionType::Execution),
        "habit" => Some(ActionType::Habit),
        _ => None,
    }
}

pub(crate) fn achievement_status_to_db(status: AchievementStatus) -> &'static str {
    match status {
        AchievementStatus::NotAchieved => "not_achieved",
        AchievementStatus::Achieved => "achieved",
    }
}

pub(crate) fn parse_achievement_status(value: &str) -> Option<AchievementStatus> {
    match value {
        "not_achieved" => Some(AchievementStatus::NotAchieved),
        "achieved" => Some(AchievementStatus::Achieved),
        _ => None,
    }
}

pub(crate) fn goal_status_to_db(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::NotAchieved => "not_achieved",
        GoalStatus::Achieved => "achieved",
        GoalStatus::Completed => "completed",
    }
}

pub(crate) fn parse_goal_status(value: &str) -> Option<GoalStatus> {
    match value {
        "not_achieved" => Some(GoalStatus::NotAchieved),
        "achieved" => Some(GoalStatus::Achieved),
        "completed" => Some(GoalStatus::Completed),
        _ => None,
    }
}
