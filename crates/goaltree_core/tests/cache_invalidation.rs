use goaltree_core::db::open_db_in_memory;
use goaltree_core::{
    progress_cache_key, task_list_cache_key, Action, ActionType, CacheError, CacheResult,
    CacheStore, CachedProgressReader, CascadeConfig, CascadeCoordinator, CascadeOutcome, Goal,
    GoalTreeRepository, MemoryCache, ProgressKey, ProgressReader, SqliteGoalTreeRepository,
    SqliteProgressStore, SubGoal, Task, TaskProgressService, TaskStatus, UserId,
};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const TTL: Duration = Duration::from_secs(60);

struct Tree {
    user: UserId,
    keys: [ProgressKey; 3],
    tasks: Vec<Uuid>,
}

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed_tree(conn: &Connection, task_count: usize) -> Tree {
    let repo = SqliteGoalTreeRepository::new(conn);
    let user = Uuid::new_v4();
    let goal = Goal::new(user, "Ship a side project");
    let sub_goal = SubGoal::new(goal.id, "Write the backend");
    let action = Action::new(sub_goal.id, ActionType::Execution, "Endpoints");
    repo.create_goal(&goal).unwrap();
    repo.create_sub_goal(&sub_goal).unwrap();
    repo.create_action(&action).unwrap();
    let tasks = (0..task_count)
        .map(|index| {
            repo.create_task(&Task::new(action.id, format!("endpoint {index}")))
                .unwrap()
        })
        .collect();
    Tree {
        user,
        keys: [
            ProgressKey::Action(action.id),
            ProgressKey::SubGoal(sub_goal.id),
            ProgressKey::Goal(goal.id),
        ],
        tasks,
    }
}

struct UnavailableCache;

impl CacheStore for UnavailableCache {
    fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    fn delete_pattern(&self, _pattern: &str) -> CacheResult<usize> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }
}

#[test]
fn cascade_drops_cached_progress_of_every_level() {
    let conn = setup();
    let tree = seed_tree(&conn, 2);
    let cache = Arc::new(MemoryCache::new());
    let reader = CachedProgressReader::new(SqliteProgressStore::new(&conn), cache.clone(), TTL);
    for key in tree.keys {
        reader.read_progress(key).unwrap();
    }
    assert_eq!(cache.len(), 3);

    let coordinator = CascadeCoordinator::new(
        SqliteProgressStore::new(&conn),
        cache.clone(),
        CascadeConfig::default(),
    );
    coordinator
        .apply_task_status(tree.tasks[0], TaskStatus::Completed)
        .unwrap();

    for key in tree.keys {
        assert_eq!(cache.get(&progress_cache_key(key)).unwrap(), None);
    }
    let goal = reader.read_progress(tree.keys[2]).unwrap().unwrap();
    assert_eq!(goal.progress.value(), 50);
}

#[test]
fn skipped_cascade_leaves_cache_untouched() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let cache = Arc::new(MemoryCache::new());
    let reader = CachedProgressReader::new(SqliteProgressStore::new(&conn), cache.clone(), TTL);
    reader.read_progress(tree.keys[0]).unwrap();
    let coordinator = CascadeCoordinator::new(
        SqliteProgressStore::new(&conn),
        cache.clone(),
        CascadeConfig::default(),
    );

    let outcome = coordinator.on_task_status_changed(Uuid::new_v4()).unwrap();

    assert!(matches!(outcome, CascadeOutcome::Skipped { .. }));
    assert_eq!(cache.len(), 1);
}

#[test]
fn unavailable_cache_does_not_fail_committed_cascade() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let coordinator = CascadeCoordinator::new(
        SqliteProgressStore::new(&conn),
        Arc::new(UnavailableCache),
        CascadeConfig::default(),
    );

    let outcome = coordinator
        .apply_task_status(tree.tasks[0], TaskStatus::Completed)
        .unwrap();

    assert!(matches!(outcome, CascadeOutcome::Applied(_)));
    let store = SqliteProgressStore::new(&conn);
    let goal = store.read_progress(tree.keys[2]).unwrap().unwrap();
    assert_eq!(goal.progress.value(), 100);
    assert!(goal.achieved);
}

#[test]
fn cached_reader_serves_hits_without_touching_storage() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let cache = Arc::new(MemoryCache::new());
    let reader = CachedProgressReader::new(SqliteProgressStore::new(&conn), cache.clone(), TTL);

    let first = reader.read_progress(tree.keys[0]).unwrap().unwrap();
    // bypass the coordinator so the cached entry goes stale on purpose
    conn.execute(
        "UPDATE actions SET progress = 40, version = version + 1;",
        [],
    )
    .unwrap();
    let second = reader.read_progress(tree.keys[0]).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(second.progress.value(), 0);
}

#[test]
fn cached_reader_falls_through_when_cache_is_unavailable() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let reader = CachedProgressReader::new(
        SqliteProgressStore::new(&conn),
        Arc::new(UnavailableCache),
        TTL,
    );

    let snapshot = reader.read_progress(tree.keys[1]).unwrap().unwrap();
    assert_eq!(snapshot.key, tree.keys[1]);
    assert!(!snapshot.achieved);

    let missing = reader
        .read_progress(ProgressKey::Goal(Uuid::new_v4()))
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn undecodable_cache_entry_is_treated_as_miss() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let cache = Arc::new(MemoryCache::new());
    cache
        .set(&progress_cache_key(tree.keys[0]), "not json", TTL)
        .unwrap();
    let reader = CachedProgressReader::new(SqliteProgressStore::new(&conn), cache.clone(), TTL);

    let snapshot = reader.read_progress(tree.keys[0]).unwrap().unwrap();

    assert_eq!(snapshot.progress.value(), 0);
    let refilled = cache.get(&progress_cache_key(tree.keys[0])).unwrap().unwrap();
    assert_ne!(refilled, "not json");
}

#[test]
fn task_status_change_clears_owner_task_lists_only() {
    let conn = setup();
    let tree = seed_tree(&conn, 2);
    let other_user = Uuid::new_v4();
    let cache = Arc::new(MemoryCache::new());
    let own_page = task_list_cache_key(tree.user, "page-1");
    let other_page = task_list_cache_key(other_user, "page-1");
    cache.set(&own_page, "[]", TTL).unwrap();
    cache.set(&other_page, "[]", TTL).unwrap();
    let service = TaskProgressService::new(
        SqliteProgressStore::new(&conn),
        cache.clone(),
        CascadeConfig::default(),
    );

    let outcome = service
        .change_task_status(tree.tasks[0], TaskStatus::Completed)
        .unwrap();

    let CascadeOutcome::Applied(report) = outcome else {
        panic!("expected applied cascade");
    };
    assert_eq!(report.owner_id, tree.user);
    assert_eq!(cache.get(&own_page).unwrap(), None);
    assert_eq!(cache.get(&other_page).unwrap().as_deref(), Some("[]"));
}

#[test]
fn task_status_change_on_missing_task_keeps_task_lists() {
    let conn = setup();
    let tree = seed_tree(&conn, 1);
    let cache = Arc::new(MemoryCache::new());
    let own_page = task_list_cache_key(tree.user, "page-1");
    cache.set(&own_page, "[]", TTL).unwrap();
    let service = TaskProgressService::new(
        SqliteProgressStore::new(&conn),
        cache.clone(),
        CascadeConfig::default(),
    );

    let outcome = service
        .change_task_status(Uuid::new_v4(), TaskStatus::Completed)
        .unwrap();

    assert!(matches!(outcome, CascadeOutcome::Skipped { .. }));
    assert!(cache.get(&own_page).unwrap().is_some());
}
