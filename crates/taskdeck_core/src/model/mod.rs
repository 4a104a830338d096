//! Domain model for the task collection.
//!
//! # Responsibility
//! - Define the canonical task record used by store, query and persistence.
//! - Own field-level validation so every layer shares one rule set.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - Titles are never blank once a task exists.

pub mod task;
