//! Core domain logic for goal trees.
//! This crate owns progress aggregation, achievement transitions and the
//! cascade that keeps Task → Action → SubGoal → Goal consistent.

pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod progress;
pub mod repo;
pub mod service;

pub use cache::cached_reader::CachedProgressReader;
pub use cache::keys::{progress_cache_key, task_list_cache_key, task_list_cache_pattern};
pub use cache::memory::MemoryCache;
pub use cache::{CacheError, CacheResult, CacheStore};
pub use config::{CascadeConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::action::{Action, ActionId, ActionType};
pub use model::chain::OwnershipChain;
pub use model::goal::{Goal, GoalId, SubGoal, SubGoalId, UserId};
pub use model::progress::Progress;
pub use model::snapshot::{ProgressKey, ProgressSnapshot};
pub use model::status::{AchievementStatus, GoalStatus};
pub use model::task::{Task, TaskId, TaskStatus};
pub use progress::achievement::{next_achievement_status, next_goal_status, RegressionPolicy};
pub use progress::calculator::{
    compute_action_progress, compute_aggregate_progress, compute_task_progress,
};
pub use repo::error::{RepoError, RepoResult};
pub use repo::goal_tree_repo::{GoalTreeRepository, SqliteGoalTreeRepository};
pub use repo::progress_repo::{ProgressReader, ProgressStore, ProgressTx, SqliteProgressStore};
pub use service::cascade_service::{
    CascadeCoordinator, CascadeError, CascadeOutcome, CascadeReport, LevelChange,
};
pub use service::task_progress_service::TaskProgressService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
