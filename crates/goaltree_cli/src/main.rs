//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `goaltree_core` linkage with deterministic output.
//! - Seed a small goal tree and run one cascade end to end.
//!
//! Usage: `goaltree_cli [DB_PATH]`. Without a path the demo runs in memory.
//! `GOALTREE_LOG_DIR` enables file logging, `GOALTREE_CONFIG` points at a
//! JSON cascade config.

use goaltree_core::{
    default_log_level, init_logging, open_db, open_db_in_memory, Action, ActionType,
    CachedProgressReader, CascadeConfig, CascadeOutcome, Goal, GoalTreeRepository, MemoryCache,
    ProgressKey, ProgressReader, SqliteGoalTreeRepository, SqliteProgressStore, SubGoal, Task,
    TaskId, TaskProgressService, TaskStatus,
};
use log::info;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

fn main() -> Result<(), Box<dyn Error>> {
    println!("goaltree_core ping={}", goaltree_core::ping());
    println!("goaltree_core version={}", goaltree_core::core_version());

    if let Ok(log_dir) = std::env::var("GOALTREE_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }
    let config = match std::env::var("GOALTREE_CONFIG") {
        Ok(path) => CascadeConfig::from_json_file(path)?,
        Err(_) => CascadeConfig::default(),
    };

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let repo = SqliteGoalTreeRepository::new(&conn);
    let goal = Goal::new(Uuid::new_v4(), "Run a half marathon");
    let sub_goal = SubGoal::new(goal.id, "Build endurance");
    let plan = Action::new(sub_goal.id, ActionType::Execution, "Training plan");
    let habit = Action::new(sub_goal.id, ActionType::Habit, "Daily stretching");
    repo.create_goal(&goal)?;
    repo.create_sub_goal(&sub_goal)?;
    repo.create_action(&plan)?;
    repo.create_action(&habit)?;

    let mut finished: Vec<TaskId> = Vec::new();
    for index in 0..4 {
        let task = Task::new(plan.id, format!("Plan step {index}"));
        repo.create_task(&task)?;
        if index < 2 {
            finished.push(task.id);
        }
    }
    for day in 0..10 {
        let task = Task::new(habit.id, format!("Stretch day {day}"));
        repo.create_task(&task)?;
        if day < 8 {
            finished.push(task.id);
        }
    }

    let cache = Arc::new(MemoryCache::new());
    let ttl = config.progress_cache_ttl();
    let service = TaskProgressService::new(SqliteProgressStore::new(&conn), cache.clone(), config);
    let mut cascades = 0;
    for task_id in finished {
        if let CascadeOutcome::Applied(_) =
            service.change_task_status(task_id, TaskStatus::Completed)?
        {
            cascades += 1;
        }
    }
    info!("event=cli_demo module=cli status=ok cascades={cascades}");

    let reader = CachedProgressReader::new(SqliteProgressStore::new(&conn), cache, ttl);
    for (label, key) in [
        ("action.plan", ProgressKey::Action(plan.id)),
        ("action.habit", ProgressKey::Action(habit.id)),
        ("sub_goal", ProgressKey::SubGoal(sub_goal.id)),
        ("goal", ProgressKey::Goal(goal.id)),
    ] {
        if let Some(snapshot) = reader.read_progress(key)? {
            println!(
                "{label} progress={} achieved={}",
                snapshot.progress, snapshot.achieved
            );
        }
    }

    Ok(())
}
