//! Cache key scheme shared by the cascade engine and its callers.
//!
//! - `progress:action:{id}`, `progress:subgoal:{id}`, `progress:goal:{id}`
//! - `tasks:{user_id}:{filter_hash}` for per-user task list pages

use crate::model::goal::UserId;
use crate::model::snapshot::ProgressKey;

pub fn progress_cache_key(key: ProgressKey) -> String {
    match key {
        ProgressKey::Action(id) => format!("progress:action:{id}"),
        ProgressKey::SubGoal(id) => format!("progress:subgoal:{id}"),
        ProgressKey::Goal(id) => format!("progress:goal:{id}"),
    }
}

pub fn task_list_cache_key(user_id: UserId, filter_hash: &str) -> String {
    format!("tasks:{user_id}:{filter_hash}")
}

/// Regex matching every task list key of `user_id`.
pub fn task_list_cache_pattern(user_id: UserId) -> String {
    format!("^tasks:{}:", regex::escape(&user_id.to_string()))
}
