use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use taskdeck_core::db::migrations::latest_version;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{Priority, RepoError, SqliteTaskRepository, Task, TaskRepository};
use uuid::Uuid;

fn task(title: &str) -> Task {
    let created_at = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    Task::with_id(Uuid::new_v4(), title, created_at).unwrap()
}

#[test]
fn insert_and_get_roundtrip_preserves_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut original = task("file taxes");
    original.description = Some("before the deadline".to_string());
    original.category = Some("admin".to_string());
    original.priority = Some(Priority::Medium);
    original.due_date = NaiveDate::from_ymd_opt(2026, 4, 15);
    repo.insert_task(&original).unwrap();

    let loaded = repo.get_task(original.id).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn load_returns_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let ids: Vec<_> = ["c", "a", "b"]
        .into_iter()
        .map(|title| {
            let task = task(title);
            repo.insert_task(&task).unwrap();
            task.id
        })
        .collect();

    let loaded: Vec<_> = repo
        .load_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(loaded, ids);
}

#[test]
fn update_existing_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = task("draft");
    repo.insert_task(&task).unwrap();

    task.title = "final".to_string();
    task.completed = true;
    task.priority = Some(Priority::High);
    repo.update_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.title, "final");
    assert!(loaded.completed);
    assert_eq!(loaded.priority, Some(Priority::High));
}

#[test]
fn update_and_delete_missing_task_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let missing = task("missing");

    let err = repo.update_task(&missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));

    let err = repo.delete_task(missing.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut invalid = task("ok");
    invalid.title = "  ".to_string();
    assert!(matches!(
        repo.insert_task(&invalid).unwrap_err(),
        RepoError::Validation(_)
    ));

    let mut valid = task("valid");
    repo.insert_task(&valid).unwrap();
    valid.title = String::new();
    assert!(matches!(
        repo.update_task(&valid).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn batch_delete_is_atomic() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let kept = task("kept");
    let doomed = task("doomed");
    repo.insert_task(&kept).unwrap();
    repo.insert_task(&doomed).unwrap();

    let err = repo.delete_tasks(&[doomed.id, Uuid::new_v4()]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(repo.load_tasks().unwrap().len(), 2);

    repo.delete_tasks(&[doomed.id]).unwrap();
    let remaining = repo.load_tasks().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
}

#[test]
fn read_rejects_invalid_persisted_priority() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = task("tampered");
    repo.insert_task(&task).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE tasks SET priority = 'urgent';", [])
        .unwrap();

    let err = repo.load_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("urgent")));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_tasks_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTaskRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("tasks"))
    ));
}
