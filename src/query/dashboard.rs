//! Landing page statistics, computed from live data on every request.

use super::ordering;
use crate::error::AppError;
use crate::models::{Priority, Task};
use crate::store::Store;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days after today that still count as "upcoming", inclusive.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const UPCOMING_LIMIT: usize = 5;

/// Task counts per priority.
///
/// Only High, Medium and Low have buckets. Urgent tasks are counted in the
/// dashboard totals but appear in no bucket; that matches the established
/// dashboard and is most likely an oversight there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityHistogram {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut histogram = Self::default();
        for task in tasks {
            match task.priority {
                Priority::High => histogram.high += 1,
                Priority::Medium => histogram.medium += 1,
                Priority::Low => histogram.low += 1,
                Priority::Urgent => {}
            }
        }
        histogram
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub num_workers: u64,
    pub num_tasks: usize,
    pub num_completed_tasks: usize,
    pub upcoming_deadlines: Vec<Task>,
    pub priority: PriorityHistogram,
}

impl DashboardStats {
    pub fn compute(num_workers: u64, tasks: &[Task], today: NaiveDate) -> Self {
        let window_end = today + Duration::days(UPCOMING_WINDOW_DAYS);

        let mut upcoming: Vec<Task> = tasks
            .iter()
            .filter(|task| !task.is_completed)
            .filter(|task| {
                let due = task.deadline.date_naive();
                due >= today && due <= window_end
            })
            .cloned()
            .collect();
        upcoming.sort_by(ordering::task_by_deadline);
        upcoming.truncate(UPCOMING_LIMIT);

        Self {
            num_workers,
            num_tasks: tasks.len(),
            num_completed_tasks: tasks.iter().filter(|task| task.is_completed).count(),
            upcoming_deadlines: upcoming,
            priority: PriorityHistogram::from_tasks(tasks),
        }
    }
}

pub async fn dashboard(store: &dyn Store, today: NaiveDate) -> Result<DashboardStats, AppError> {
    store.dashboard_stats(today).await
}
