//! Persistence access.
//!
//! `Store` is the only way the rest of the crate touches data. Filtering,
//! counting and page windows happen here so a backend can push them into its
//! query language. The provided methods sort with `crate::query::ordering`
//! and cut in process; `PgStore` overrides them with SQL.
//!
//! Cascades are explicit: deleting a task type deletes its tasks, deleting a
//! position deletes its workers, and deleting a worker strips it from every
//! assignee set without deleting any task.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::{NewTask, NewWorker, Position, Task, TaskType, Worker, WorkerUpdate};
use crate::query::{ordering, DashboardStats, NameFilter, TaskFilter, WorkerFilter};
use async_trait::async_trait;
use chrono::NaiveDate;

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_positions(&self, filter: &NameFilter) -> StoreResult<Vec<Position>>;
    async fn get_position(&self, id: i64) -> StoreResult<Option<Position>>;
    async fn create_position(&self, name: &str) -> StoreResult<Position>;
    /// Deletes the position and every worker holding it.
    /// Returns `false` when no such position exists.
    async fn delete_position(&self, id: i64) -> StoreResult<bool>;

    async fn list_task_types(&self, filter: &NameFilter) -> StoreResult<Vec<TaskType>>;
    async fn get_task_type(&self, id: i64) -> StoreResult<Option<TaskType>>;
    async fn create_task_type(&self, name: &str) -> StoreResult<TaskType>;
    /// Deletes the task type and every task of that type.
    async fn delete_task_type(&self, id: i64) -> StoreResult<bool>;

    async fn list_workers(&self, filter: &WorkerFilter) -> StoreResult<Vec<Worker>>;
    async fn get_worker(&self, id: i64) -> StoreResult<Option<Worker>>;
    async fn find_worker_by_username(&self, username: &str) -> StoreResult<Option<Worker>>;
    /// Fails with a `username` validation error when the name is taken.
    async fn create_worker(&self, worker: NewWorker) -> StoreResult<Worker>;
    async fn update_worker(&self, id: i64, update: WorkerUpdate) -> StoreResult<Option<Worker>>;
    /// Removes the worker from every assignee set, then deletes it.
    async fn delete_worker(&self, id: i64) -> StoreResult<bool>;
    async fn count_workers(&self) -> StoreResult<u64>;

    async fn count_filtered_workers(&self, filter: &WorkerFilter) -> StoreResult<usize> {
        Ok(self.list_workers(filter).await?.len())
    }

    /// `limit` workers from `offset`, in listing order.
    async fn worker_window(
        &self,
        filter: &WorkerFilter,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Worker>> {
        let mut workers = self.list_workers(filter).await?;
        workers.sort_by(ordering::worker_default);
        Ok(workers.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, id: i64) -> StoreResult<Option<Task>>;
    async fn tasks_assigned_to(&self, worker_id: i64) -> StoreResult<Vec<Task>>;
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;
    /// Replaces every field and the assignee set.
    async fn update_task(&self, id: i64, task: NewTask) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: i64) -> StoreResult<bool>;

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<usize> {
        Ok(self.list_tasks(filter).await?.len())
    }

    /// `limit` tasks from `offset`, in listing order.
    async fn task_window(
        &self,
        filter: &TaskFilter,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Task>> {
        let mut tasks = self.list_tasks(filter).await?;
        tasks.sort_by(ordering::task_default);
        Ok(tasks.into_iter().skip(offset).take(limit).collect())
    }

    /// Dashboard aggregates as of `today` (UTC).
    async fn dashboard_stats(&self, today: NaiveDate) -> StoreResult<DashboardStats> {
        let num_workers = self.count_workers().await?;
        let tasks = self.list_tasks(&TaskFilter::default()).await?;
        Ok(DashboardStats::compute(num_workers, &tasks, today))
    }
}
