//! In-memory ordered task collection.
//!
//! # Responsibility
//! - Own the ordered task list and its mutating operations.
//! - Hand out filtered and sorted views without mutating stored order.
//!
//! # Invariants
//! - Task ids are unique for the store lifetime.
//! - New tasks are appended; stored order only changes by removal.
//! - Every operation is all-or-nothing: a failed call leaves the store as it was.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
use crate::query::filter::{FilteredView, TaskFilter};
use crate::query::sort::{sort_tasks, SortDirection, SortKey};
use chrono::SubsecRound;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable failures reported by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(TaskValidationError),
    NotFound(TaskId),
    DuplicateId(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateId(id) => write!(f, "task id already present: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Completion tally for a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Ordered, exclusively owned collection of tasks.
pub struct TaskStore {
    tasks: Vec<Task>,
    clock: Box<dyn Clock>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Creates an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty store using `clock` for `created_at`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            tasks: Vec::new(),
            clock: Box::new(clock),
        }
    }

    /// Appends a task with a title and optional description.
    ///
    /// # Errors
    /// - `Validation(EmptyTitle)` when `title` is blank.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> StoreResult<Task> {
        let draft = TaskDraft {
            title: title.into(),
            description,
            ..TaskDraft::default()
        };
        self.add_draft(draft)
    }

    /// Appends a task built from `draft`.
    pub fn add_draft(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let task = self.prepare(draft)?;
        self.insert(task.clone())?;
        Ok(task)
    }

    /// Builds a validated task with a fresh id without inserting it.
    pub fn prepare(&self, draft: TaskDraft) -> StoreResult<Task> {
        let mut id = Uuid::new_v4();
        while self.position(id).is_some() {
            id = Uuid::new_v4();
        }

        // Millisecond precision matches what storage keeps.
        let created_at = self.clock.now().trunc_subsecs(3);
        let mut task = Task::with_id(id, draft.title, created_at)?;
        let patch = TaskPatch {
            description: Some(draft.description),
            category: Some(draft.category),
            priority: Some(draft.priority),
            due_date: Some(draft.due_date),
            ..TaskPatch::default()
        };
        task = patch.apply_to(&task)?;
        Ok(task)
    }

    /// Appends an existing task, keeping its id and timestamps.
    ///
    /// # Errors
    /// - `Validation` when the task breaks record invariants.
    /// - `DuplicateId` when a task with the same id is present.
    pub fn insert(&mut self, task: Task) -> StoreResult<()> {
        task.validate()?;
        if self.position(task.id).is_some() {
            return Err(StoreError::DuplicateId(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Flips `completed` and returns the new value.
    pub fn toggle(&mut self, id: TaskId) -> StoreResult<bool> {
        let index = self.index_of(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Sets `completed` explicitly. Returns whether the value changed.
    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> StoreResult<bool> {
        let index = self.index_of(id)?;
        let task = &mut self.tasks[index];
        let changed = task.completed != completed;
        task.completed = completed;
        Ok(changed)
    }

    /// Removes a task and returns it.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.index_of(id)?;
        Ok(self.tasks.remove(index))
    }

    /// Applies a partial update and returns the updated task.
    ///
    /// An empty patch succeeds and returns the task unchanged.
    pub fn update(&mut self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        let next = self.patched(id, patch)?;
        self.replace(next.clone())?;
        Ok(next)
    }

    /// Computes the result of `update` without applying it.
    pub fn patched(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        let current = self.get(id).ok_or(StoreError::NotFound(id))?;
        Ok(patch.apply_to(current)?)
    }

    /// Swaps in `task` at the position of the stored task with the same id.
    pub fn replace(&mut self, task: Task) -> StoreResult<()> {
        task.validate()?;
        let index = self.index_of(task.id)?;
        self.tasks[index] = task;
        Ok(())
    }

    /// Removes every completed task and returns them in stored order.
    pub fn clear_completed(&mut self) -> Vec<Task> {
        let (completed, active): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.completed);
        self.tasks = active;
        completed
    }

    /// Ids of completed tasks in stored order.
    pub fn completed_ids(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.completed)
            .map(|task| task.id)
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskCounts {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Lazy view of the tasks matching `filter`, in stored order.
    pub fn filter(&self, filter: TaskFilter) -> FilteredView<'_> {
        FilteredView::new(&self.tasks, filter)
    }

    /// All tasks in a derived order. Stored order is untouched.
    pub fn sort(&self, key: SortKey, direction: SortDirection) -> Vec<&Task> {
        sort_tasks(&self.tasks, key, direction)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn index_of(&self, id: TaskId) -> StoreResult<usize> {
        self.position(id).ok_or(StoreError::NotFound(id))
    }
}

impl<'a> IntoIterator for &'a TaskStore {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, TaskStore};
    use crate::clock::FixedClock;
    use crate::model::task::{Priority, TaskDraft, TaskPatch, TaskValidationError};
    use chrono::{NaiveDate, TimeZone, Timelike, Utc};

    fn fixed_store() -> TaskStore {
        TaskStore::with_clock(FixedClock(
            Utc.with_ymd_and_hms(2026, 2, 14, 8, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn add_stamps_creation_time_from_clock() {
        let mut store = fixed_store();
        let task = store.add("  Buy milk  ", None).unwrap();

        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2026, 2, 14, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn add_draft_keeps_optional_fields() {
        let mut store = fixed_store();
        let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let task = store
            .add_draft(
                TaskDraft::new("Pay rent")
                    .category("home")
                    .priority(Priority::High)
                    .due_date(due)
                    .description("  "),
            )
            .unwrap();

        assert_eq!(task.category.as_deref(), Some("home"));
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.description, None);
    }

    #[test]
    fn prepare_truncates_created_at_to_milliseconds() {
        let precise = Utc
            .with_ymd_and_hms(2026, 2, 14, 8, 0, 0)
            .unwrap()
            .with_nanosecond(738_412_581)
            .unwrap();
        let mut store = TaskStore::with_clock(FixedClock(precise));

        let task = store.add("stamp", None).unwrap();
        assert_eq!(task.created_at.nanosecond(), 738_000_000);
        assert_eq!(task.created_at.timestamp_millis(), precise.timestamp_millis());
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut store = fixed_store();
        let task = store.add("once", None).unwrap();

        let err = store.insert(task.clone()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(task.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_update_leaves_task_untouched() {
        let mut store = fixed_store();
        let task = store.add("original", None).unwrap();
        let patch = TaskPatch {
            title: Some(String::new()),
            category: Some(Some("ignored".to_string())),
            ..TaskPatch::default()
        };

        let err = store.update(task.id, &patch).unwrap_err();
        assert_eq!(err, StoreError::Validation(TaskValidationError::EmptyTitle));
        assert_eq!(store.get(task.id), Some(&task));
    }

    #[test]
    fn set_completed_reports_change() {
        let mut store = fixed_store();
        let task = store.add("x", None).unwrap();

        assert!(store.set_completed(task.id, true).unwrap());
        assert!(!store.set_completed(task.id, true).unwrap());
        assert!(store.get(task.id).unwrap().completed);
    }

    #[test]
    fn clear_completed_keeps_remaining_order() {
        let mut store = fixed_store();
        let a = store.add("a", None).unwrap();
        let b = store.add("b", None).unwrap();
        let c = store.add("c", None).unwrap();
        let d = store.add("d", None).unwrap();
        store.toggle(b.id).unwrap();
        store.toggle(d.id).unwrap();

        let removed = store.clear_completed();
        let removed_ids: Vec<_> = removed.iter().map(|task| task.id).collect();
        let kept_ids: Vec<_> = store.iter().map(|task| task.id).collect();
        assert_eq!(removed_ids, vec![b.id, d.id]);
        assert_eq!(kept_ids, vec![a.id, c.id]);
    }

    #[test]
    fn counts_track_completion() {
        let mut store = fixed_store();
        let a = store.add("a", None).unwrap();
        store.add("b", None).unwrap();
        store.toggle(a.id).unwrap();

        let counts = store.counts();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.completed, 1);
    }
}
