//! Task status use case.
//!
//! # Responsibility
//! - Persist a task's new status and cascade it as one atomic unit.
//! - Drop the owner's cached task list pages after a successful change.
//!
//! # Invariants
//! - List cache invalidation is best-effort and only follows a committed
//!   cascade.

use crate::cache::keys::task_list_cache_pattern;
use crate::cache::CacheStore;
use crate::config::CascadeConfig;
use crate::model::task::{TaskId, TaskStatus};
use crate::repo::progress_repo::ProgressStore;
use crate::service::cascade_service::{CascadeCoordinator, CascadeError, CascadeOutcome};
use log::{info, warn};
use std::sync::Arc;

/// Entry point for task status updates coming from outer layers.
pub struct TaskProgressService<S: ProgressStore> {
    coordinator: CascadeCoordinator<S>,
    cache: Arc<dyn CacheStore>,
}

impl<S: ProgressStore> TaskProgressService<S> {
    pub fn new(store: S, cache: Arc<dyn CacheStore>, config: CascadeConfig) -> Self {
        Self {
            coordinator: CascadeCoordinator::new(store, Arc::clone(&cache), config),
            cache,
        }
    }

    pub fn coordinator(&self) -> &CascadeCoordinator<S> {
        &self.coordinator
    }

    /// Sets `status` on `task_id` and propagates the change to the root.
    ///
    /// Returns `CascadeOutcome::Skipped` without writing anything when the
    /// task does not exist.
    pub fn change_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<CascadeOutcome, CascadeError> {
        let outcome = self.coordinator.apply_task_status(task_id, status)?;

        if let CascadeOutcome::Applied(report) = &outcome {
            let pattern = task_list_cache_pattern(report.owner_id);
            match self.cache.delete_pattern(&pattern) {
                Ok(removed) => info!(
                    "event=task_status_change module=service status=ok task_id={} new_status={:?} list_cache_removed={}",
                    task_id, status, removed
                ),
                Err(err) => warn!(
                    "event=cache_invalidate module=service status=error pattern={} error={}",
                    pattern, err
                ),
            }
        }

        Ok(outcome)
    }
}
