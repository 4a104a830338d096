//! Task use-case service.
//!
//! # Responsibility
//! - Pair the in-memory `TaskStore` with a `TaskRepository`.
//! - Expose store operations with write-through persistence.
//!
//! # Invariants
//! - The repository write runs first; the store changes only after it succeeds.
//! - Log events carry ids and counts, never task titles.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::query::filter::{FilteredView, TaskFilter};
use crate::query::sort::{SortDirection, SortKey};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::store::{StoreError, TaskCounts, TaskStore};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Rejected by collection rules (validation, unknown id).
    Store(StoreError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// An id or id prefix matched zero or several tasks.
    UnresolvedId { input: String, candidates: usize },
}

impl ServiceError {
    /// Returns whether the error is an unknown-id condition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::NotFound(_))
                | Self::Repo(RepoError::NotFound(_))
                | Self::UnresolvedId { candidates: 0, .. }
        )
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnresolvedId { input, candidates } if *candidates == 0 => {
                write!(f, "no task matches id `{input}`")
            }
            Self::UnresolvedId { input, candidates } => {
                write!(f, "id prefix `{input}` is ambiguous ({candidates} tasks match)")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnresolvedId { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Task service facade over a repository implementation.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    store: TaskStore,
}

impl<R: TaskRepository> TaskService<R> {
    /// Loads all persisted tasks and stamps new ones with the system clock.
    pub fn open(repo: R) -> ServiceResult<Self> {
        Self::open_with_clock(repo, SystemClock)
    }

    /// Loads all persisted tasks into a store driven by `clock`.
    pub fn open_with_clock(repo: R, clock: impl Clock + 'static) -> ServiceResult<Self> {
        let mut store = TaskStore::with_clock(clock);
        for task in repo.load_tasks()? {
            store.insert(task)?;
        }
        info!(
            "event=tasks_load module=service status=ok count={}",
            store.len()
        );
        Ok(Self { repo, store })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Read access to the hydrated collection.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> ServiceResult<Task> {
        let draft = TaskDraft {
            title: title.into(),
            description,
            ..TaskDraft::default()
        };
        self.add_draft(draft)
    }

    pub fn add_draft(&mut self, draft: TaskDraft) -> ServiceResult<Task> {
        let task = self.store.prepare(draft)?;
        self.repo.insert_task(&task)?;
        self.store.insert(task.clone())?;
        debug!("event=task_add module=service status=ok task_id={}", task.id);
        Ok(task)
    }

    /// Flips completion and returns the new value.
    pub fn toggle(&mut self, id: TaskId) -> ServiceResult<bool> {
        let mut next = self.find(id)?.clone();
        next.completed = !next.completed;
        self.repo.update_task(&next)?;
        let completed = next.completed;
        self.store.replace(next)?;
        debug!(
            "event=task_toggle module=service status=ok task_id={id} completed={completed}"
        );
        Ok(completed)
    }

    pub fn update(&mut self, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        let next = self.store.patched(id, patch)?;
        if patch.is_empty() {
            return Ok(next);
        }
        self.repo.update_task(&next)?;
        self.store.replace(next.clone())?;
        debug!("event=task_update module=service status=ok task_id={id}");
        Ok(next)
    }

    pub fn delete(&mut self, id: TaskId) -> ServiceResult<Task> {
        self.find(id)?;
        self.repo.delete_task(id)?;
        let removed = self.store.delete(id)?;
        debug!("event=task_delete module=service status=ok task_id={id}");
        Ok(removed)
    }

    /// Removes every completed task in one repository batch.
    pub fn clear_completed(&mut self) -> ServiceResult<Vec<Task>> {
        let ids = self.store.completed_ids();
        if let Err(err) = self.repo.delete_tasks(&ids) {
            warn!(
                "event=tasks_clear_completed module=service status=error count={} error={err}",
                ids.len()
            );
            return Err(err.into());
        }
        let removed = self.store.clear_completed();
        info!(
            "event=tasks_clear_completed module=service status=ok count={}",
            removed.len()
        );
        Ok(removed)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    pub fn filter(&self, filter: TaskFilter) -> FilteredView<'_> {
        self.store.filter(filter)
    }

    pub fn sort(&self, key: SortKey, direction: SortDirection) -> Vec<&Task> {
        self.store.sort(key, direction)
    }

    /// Resolves a full id or a unique id prefix (as printed by list views).
    pub fn resolve_id(&self, input: &str) -> ServiceResult<TaskId> {
        let needle = input.trim().to_ascii_lowercase();
        let candidates: Vec<TaskId> = if needle.is_empty() {
            Vec::new()
        } else {
            self.store
                .iter()
                .filter(|task| task.id.to_string().starts_with(&needle))
                .map(|task| task.id)
                .collect()
        };
        match candidates.as_slice() {
            [id] => Ok(*id),
            _ => Err(ServiceError::UnresolvedId {
                input: input.trim().to_string(),
                candidates: candidates.len(),
            }),
        }
    }

    fn find(&self, id: TaskId) -> ServiceResult<&Task> {
        self.store
            .get(id)
            .ok_or(ServiceError::Store(StoreError::NotFound(id)))
    }
}
