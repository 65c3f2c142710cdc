//! The listing and dashboard engine.
//!
//! Raw query parameters go in; filtered, ordered, paginated pages and
//! dashboard aggregates come out. Nothing here writes.

pub mod catalog;
pub mod dashboard;
pub mod ordering;
pub mod pagination;
pub mod tasks;
pub mod workers;

pub use catalog::{position_list, task_type_list, CatalogParams, NameFilter};
pub use dashboard::{dashboard, DashboardStats, PriorityHistogram};
pub use pagination::{paginate, Page, PAGE_SIZE};
pub use tasks::{task_page, TaskFilter, TaskListParams};
pub use workers::{worker_page, WorkerFilter, WorkerListParams};

/// Case-insensitive substring test used by every name search.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
