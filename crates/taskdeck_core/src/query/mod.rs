//! Derived, read-only views over a task collection.
//!
//! # Responsibility
//! - Express filter predicates and sort orders as plain values.
//! - Produce views without touching stored order or task state.
//!
//! # Invariants
//! - Views never mutate the collection they borrow.
//! - Sorting is stable: equal keys keep insertion order.

pub mod filter;
pub mod sort;
