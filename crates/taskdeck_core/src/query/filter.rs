//! Filter predicates and lazy filtered views.
//!
//! # Invariants
//! - A `FilteredView` yields tasks in collection order.
//! - Iterating a view twice yields the same sequence.

use crate::model::task::{Priority, Task};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Completion-status criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "open" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!(
                "unsupported status `{other}`; expected all|active|completed"
            )),
        }
    }
}

/// Conjunction of optional task criteria. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Case-insensitive exact category match.
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of title or description.
    pub text: Option<String>,
}

impl TaskFilter {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns whether `task` satisfies every present criterion.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }

        if let Some(category) = self.category.as_deref() {
            let wanted = category.trim().to_lowercase();
            let hit = task
                .category
                .as_deref()
                .is_some_and(|value| value.to_lowercase() == wanted);
            if !hit {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }

        if let Some(text) = self.text.as_deref() {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() {
                let in_title = task.title.to_lowercase().contains(&needle);
                let in_description = task
                    .description
                    .as_deref()
                    .is_some_and(|value| value.to_lowercase().contains(&needle));
                if !in_title && !in_description {
                    return false;
                }
            }
        }

        true
    }
}

/// Lazy, restartable view of the tasks matching a filter.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    tasks: &'a [Task],
    filter: TaskFilter,
}

impl<'a> FilteredView<'a> {
    pub fn new(tasks: &'a [Task], filter: TaskFilter) -> Self {
        Self { tasks, filter }
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Starts a fresh pass over the matching tasks.
    pub fn iter(&self) -> FilteredIter<'a, '_> {
        FilteredIter {
            inner: self.tasks.iter(),
            filter: &self.filter,
        }
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<&'a Task> {
        self.iter().collect()
    }
}

impl<'a, 'v> IntoIterator for &'v FilteredView<'a> {
    type Item = &'a Task;
    type IntoIter = FilteredIter<'a, 'v>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator produced by [`FilteredView::iter`].
#[derive(Debug, Clone)]
pub struct FilteredIter<'a, 'v> {
    inner: std::slice::Iter<'a, Task>,
    filter: &'v TaskFilter,
}

impl<'a> Iterator for FilteredIter<'a, '_> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner.by_ref().find(|task| filter.matches(task))
    }
}
