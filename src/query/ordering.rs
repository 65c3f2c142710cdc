//! Default orderings for every listing.
//!
//! Listings never rely on storage order: each one sorts with the comparator
//! defined here. Ties fall back to the id so pages are stable.

use crate::models::{Position, Task, TaskType, Worker};
use std::cmp::Ordering;

/// Deadline ascending, then priority by its stored string, then id.
pub fn task_default(a: &Task, b: &Task) -> Ordering {
    a.deadline
        .cmp(&b.deadline)
        .then_with(|| a.priority.as_str().cmp(b.priority.as_str()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Deadline ascending only; used for the dashboard's upcoming list.
pub fn task_by_deadline(a: &Task, b: &Task) -> Ordering {
    a.deadline.cmp(&b.deadline).then_with(|| a.id.cmp(&b.id))
}

pub fn worker_default(a: &Worker, b: &Worker) -> Ordering {
    a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id))
}

pub fn position_default(a: &Position, b: &Position) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

pub fn task_type_default(a: &TaskType, b: &TaskType) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}
