//! Stable derived orderings.
//!
//! Tasks missing the sort field (no due date, no priority) always come last,
//! whatever the direction.

use crate::model::task::Task;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive lexicographic.
    Title,
    /// Chronological.
    DueDate,
    /// Importance order; descending puts `High` first.
    ///
    /// Ascending runs `Low, Medium, High`, the reverse of a rank numbering
    /// where high = 1 and low = 3.
    Priority,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DueDate => "due",
            Self::Priority => "priority",
            Self::CreatedAt => "created",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "due" | "due_date" | "duedate" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "created" | "created_at" => Ok(Self::CreatedAt),
            other => Err(format!(
                "unsupported sort key `{other}`; expected title|due|priority|created"
            )),
        }
    }
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!(
                "unsupported sort direction `{other}`; expected asc|desc"
            )),
        }
    }
}

/// Collects `tasks` into a new vector ordered by `key` and `direction`.
///
/// The input order is the tie-breaker, so passing a collection in insertion
/// order keeps equal tasks in insertion order.
pub fn sort_tasks<'a, I>(tasks: I, key: SortKey, direction: SortDirection) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&'a Task> = tasks.into_iter().collect();
    sorted.sort_by(|left, right| compare(left, right, key, direction));
    sorted
}

fn compare(left: &Task, right: &Task, key: SortKey, direction: SortDirection) -> Ordering {
    match key {
        SortKey::Title => directed(
            left.title.to_lowercase().cmp(&right.title.to_lowercase()),
            direction,
        ),
        SortKey::CreatedAt => directed(left.created_at.cmp(&right.created_at), direction),
        SortKey::DueDate => compare_present_first(left.due_date, right.due_date, direction),
        SortKey::Priority => compare_present_first(left.priority, right.priority, direction),
    }
}

fn compare_present_first<T: Ord>(
    left: Option<T>,
    right: Option<T>,
    direction: SortDirection,
) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => directed(left.cmp(&right), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}
