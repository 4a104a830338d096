use chrono::{TimeZone, Utc};
use std::cell::Cell;
use taskdeck_core::db::{open_db, open_db_in_memory};
use taskdeck_core::{
    FixedClock, RepoError, RepoResult, ServiceError, SqliteTaskRepository, StatusFilter,
    StoreError, Task, TaskDraft, TaskFilter, TaskId, TaskPatch, TaskRepository, TaskService,
};

#[test]
fn mutations_are_persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let (milk, dog) = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut service = TaskService::open(repo).unwrap();

        let milk = service.add("Buy milk", None).unwrap();
        let dog = service.add("Walk dog", None).unwrap();
        let junk = service.add("junk", None).unwrap();
        service.toggle(dog.id).unwrap();
        service.delete(junk.id).unwrap();
        service
            .update(
                milk.id,
                &TaskPatch {
                    description: Some(Some("2 liters".to_string())),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        (milk, dog)
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let service = TaskService::open(repo).unwrap();

    let ids: Vec<_> = service.store().iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![milk.id, dog.id]);
    assert!(service.get(dog.id).unwrap().completed);
    assert_eq!(
        service.get(milk.id).unwrap().description.as_deref(),
        Some("2 liters")
    );

    let completed = service
        .filter(TaskFilter::status(StatusFilter::Completed))
        .to_vec();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "Walk dog");
}

#[test]
fn reloaded_task_equals_added_task_with_system_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let added = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut service = TaskService::open(repo).unwrap();
        service
            .add_draft(TaskDraft::new("Buy milk").category("errands"))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let service = TaskService::open(repo).unwrap();
    let reloaded = service.get(added.id).unwrap();
    assert_eq!(reloaded, &added);
}

#[test]
fn clear_completed_removes_from_store_and_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut service = TaskService::open(repo).unwrap();

    let a = service.add("a", None).unwrap();
    let b = service.add("b", None).unwrap();
    service.toggle(a.id).unwrap();

    let removed = service.clear_completed().unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, a.id);
    assert_eq!(service.counts().total, 1);

    let reloaded = SqliteTaskRepository::try_new(&conn)
        .unwrap()
        .load_tasks()
        .unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].id, b.id);
}

#[test]
fn clock_drives_created_at() {
    let instant = Utc.with_ymd_and_hms(2026, 6, 1, 7, 45, 0).unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut service = TaskService::open_with_clock(repo, FixedClock(instant)).unwrap();

    let task = service.add_draft(TaskDraft::new("stamped")).unwrap();
    assert_eq!(task.created_at, instant);
}

#[test]
fn resolve_id_accepts_unique_prefix() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut service = TaskService::open(repo).unwrap();
    let task = service.add("findable", None).unwrap();

    let full = task.id.to_string();
    assert_eq!(service.resolve_id(&full).unwrap(), task.id);
    assert_eq!(service.resolve_id(&full[..8].to_uppercase()).unwrap(), task.id);

    let err = service.resolve_id("zzzz").unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        service.resolve_id("").unwrap_err(),
        ServiceError::UnresolvedId { candidates: 0, .. }
    ));
}

#[test]
fn validation_errors_surface_as_store_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut service = TaskService::open(repo).unwrap();

    let err = service.add("   ", None).unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Validation(_))));
    assert_eq!(service.counts().total, 0);
}

/// Repository whose writes fail once `fail_writes` is set.
#[derive(Default)]
struct FlakyRepo {
    fail_writes: Cell<bool>,
}

impl FlakyRepo {
    fn check(&self, id: TaskId) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl TaskRepository for FlakyRepo {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        Ok(Vec::new())
    }

    fn get_task(&self, _id: TaskId) -> RepoResult<Option<Task>> {
        Ok(None)
    }

    fn insert_task(&self, task: &Task) -> RepoResult<()> {
        self.check(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        self.check(task.id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.check(id)
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<()> {
        ids.iter().try_for_each(|id| self.check(*id))
    }
}

#[test]
fn repository_failure_leaves_store_unchanged() {
    let mut service = TaskService::open(FlakyRepo::default()).unwrap();
    let task = service.add("stable", None).unwrap();
    service.toggle(task.id).unwrap();
    let snapshot: Vec<Task> = service.store().iter().cloned().collect();

    set_failing(&service);

    assert!(matches!(
        service.add("new", None).unwrap_err(),
        ServiceError::Repo(_)
    ));
    assert!(service.toggle(task.id).is_err());
    assert!(service
        .update(
            task.id,
            &TaskPatch {
                title: Some("renamed".to_string()),
                ..TaskPatch::default()
            }
        )
        .is_err());
    assert!(service.delete(task.id).is_err());
    assert!(service.clear_completed().is_err());

    let after: Vec<Task> = service.store().iter().cloned().collect();
    assert_eq!(after, snapshot);
}

fn set_failing(service: &TaskService<FlakyRepo>) {
    service.repository().fail_writes.set(true);
}
