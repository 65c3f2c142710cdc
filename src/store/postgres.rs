//! PostgreSQL store on a `sqlx` pool. The expected schema is in
//! `schema.sql` at the repository root.
//!
//! Foreign keys carry no `ON DELETE` action; every cascade is spelled out
//! here inside one transaction.

use super::{Store, StoreResult, DUPLICATE_USERNAME};
use crate::error::AppError;
use crate::models::{NewTask, NewWorker, Position, Task, TaskType, Worker, WorkerUpdate};
use crate::query::dashboard::{UPCOMING_LIMIT, UPCOMING_WINDOW_DAYS};
use crate::query::{DashboardStats, NameFilter, PriorityHistogram, TaskFilter, WorkerFilter};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

const TASK_SELECT: &str = "SELECT t.id, t.name, t.description, t.deadline, t.is_completed, t.priority, t.task_type_id, \
     COALESCE(ARRAY_AGG(ta.worker_id ORDER BY ta.worker_id) FILTER (WHERE ta.worker_id IS NOT NULL), '{}') AS assignees \
     FROM tasks t LEFT JOIN task_assignees ta ON ta.task_id = t.id";

const WORKER_SELECT: &str = "SELECT w.id, w.username, w.password_hash, w.first_name, w.last_name, w.email, \
     w.position_id, p.name AS position_name \
     FROM workers w LEFT JOIN positions p ON p.id = w.position_id";

#[derive(FromRow)]
struct WorkerRow {
    id: i64,
    username: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    email: String,
    position_id: Option<i64>,
    position_name: Option<String>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        let position = match (row.position_id, row.position_name) {
            (Some(id), Some(name)) => Some(Position { id, name }),
            _ => None,
        };
        Worker {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            position,
        }
    }
}

/// Escapes `LIKE` wildcards so a search term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

// Same order as `query::ordering`; "C" collation compares bytes like `str::cmp`.
const TASK_ORDER: &str = " ORDER BY t.deadline, t.priority::TEXT COLLATE \"C\", t.id";
const WORKER_ORDER: &str = " ORDER BY w.username COLLATE \"C\", w.id";

/// `WHERE` clause for a task filter. Placeholders are numbered from `$1`,
/// name before status; returns how many were used.
fn task_where(filter: &TaskFilter) -> (String, usize) {
    let mut conditions: Vec<String> = Vec::new();
    if filter.name_contains.is_some() {
        conditions.push(format!("t.name ILIKE ${} ESCAPE '\\'", conditions.len() + 1));
    }
    if filter.is_completed.is_some() {
        conditions.push(format!("t.is_completed = ${}", conditions.len() + 1));
    }
    if conditions.is_empty() {
        return (String::new(), 0);
    }
    (format!(" WHERE {}", conditions.join(" AND ")), conditions.len())
}

fn worker_where(filter: &WorkerFilter) -> (String, usize) {
    match filter.username_contains {
        Some(_) => (" WHERE w.username ILIKE $1 ESCAPE '\\'".to_string(), 1),
        None => (String::new(), 0),
    }
}

fn to_count(n: i64) -> usize {
    n.max(0) as usize
}

/// A taken username surfaces as a form error, not a 500.
fn map_unique_username(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::field("username", DUPLICATE_USERNAME)
        }
        _ => error.into(),
    }
}

async fn replace_assignees(
    tx: &mut Transaction<'_, Postgres>,
    task_id: i64,
    assignees: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query(
        "INSERT INTO task_assignees (task_id, worker_id) \
         SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(task_id)
    .bind(assignees.to_vec())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        Ok(Self::new(PgPool::connect(database_url).await?))
    }

    async fn list_named<T>(&self, table: &str, filter: &NameFilter) -> StoreResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let mut sql = format!("SELECT id, name FROM {}", table);
        if filter.name_contains.is_some() {
            sql.push_str(" WHERE name ILIKE $1 ESCAPE '\\'");
        }
        sql.push_str(" ORDER BY name, id");

        let mut query = sqlx::query_as::<_, T>(&sql);
        if let Some(term) = &filter.name_contains {
            query = query.bind(contains_pattern(term));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_positions(&self, filter: &NameFilter) -> StoreResult<Vec<Position>> {
        self.list_named("positions", filter).await
    }

    async fn get_position(&self, id: i64) -> StoreResult<Option<Position>> {
        Ok(
            sqlx::query_as::<_, Position>("SELECT id, name FROM positions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_position(&self, name: &str) -> StoreResult<Position> {
        Ok(sqlx::query_as::<_, Position>(
            "INSERT INTO positions (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_position(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM task_assignees WHERE worker_id IN \
             (SELECT id FROM workers WHERE position_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM workers WHERE position_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn list_task_types(&self, filter: &NameFilter) -> StoreResult<Vec<TaskType>> {
        self.list_named("task_types", filter).await
    }

    async fn get_task_type(&self, id: i64) -> StoreResult<Option<TaskType>> {
        Ok(
            sqlx::query_as::<_, TaskType>("SELECT id, name FROM task_types WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_task_type(&self, name: &str) -> StoreResult<TaskType> {
        Ok(sqlx::query_as::<_, TaskType>(
            "INSERT INTO task_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_task_type(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM task_assignees WHERE task_id IN \
             (SELECT id FROM tasks WHERE task_type_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM tasks WHERE task_type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM task_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn list_workers(&self, filter: &WorkerFilter) -> StoreResult<Vec<Worker>> {
        let (clause, _) = worker_where(filter);
        let sql = format!("{}{}{}", WORKER_SELECT, clause, WORKER_ORDER);

        let mut query = sqlx::query_as::<_, WorkerRow>(&sql);
        if let Some(term) = &filter.username_contains {
            query = query.bind(contains_pattern(term));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn count_filtered_workers(&self, filter: &WorkerFilter) -> StoreResult<usize> {
        let (clause, _) = worker_where(filter);
        let sql = format!("SELECT COUNT(*) FROM workers w{}", clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(term) = &filter.username_contains {
            query = query.bind(contains_pattern(term));
        }
        Ok(to_count(query.fetch_one(&self.pool).await?))
    }

    async fn worker_window(
        &self,
        filter: &WorkerFilter,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Worker>> {
        let (clause, used) = worker_where(filter);
        let sql = format!(
            "{}{}{} LIMIT ${} OFFSET ${}",
            WORKER_SELECT,
            clause,
            WORKER_ORDER,
            used + 1,
            used + 2
        );

        let mut query = sqlx::query_as::<_, WorkerRow>(&sql);
        if let Some(term) = &filter.username_contains {
            query = query.bind(contains_pattern(term));
        }
        let rows = query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn get_worker(&self, id: i64) -> StoreResult<Option<Worker>> {
        let sql = format!("{} WHERE w.id = $1", WORKER_SELECT);
        let row = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Worker::from))
    }

    async fn find_worker_by_username(&self, username: &str) -> StoreResult<Option<Worker>> {
        let sql = format!("{} WHERE w.username = $1", WORKER_SELECT);
        let row = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Worker::from))
    }

    async fn create_worker(&self, worker: NewWorker) -> StoreResult<Worker> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO workers (username, password_hash, first_name, last_name, email, position_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&worker.username)
        .bind(&worker.password_hash)
        .bind(&worker.first_name)
        .bind(&worker.last_name)
        .bind(&worker.email)
        .bind(worker.position_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_username)?;

        self.get_worker(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError(format!("worker {} vanished after insert", id)))
    }

    async fn update_worker(&self, id: i64, update: WorkerUpdate) -> StoreResult<Option<Worker>> {
        let profile = update.profile();
        let result = match update.password_hash() {
            None => {
                sqlx::query(
                    "UPDATE workers SET username = $1, first_name = $2, last_name = $3, \
                     email = $4, position_id = $5 WHERE id = $6",
                )
                .bind(&profile.username)
                .bind(&profile.first_name)
                .bind(&profile.last_name)
                .bind(&profile.email)
                .bind(profile.position_id)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            Some(hash) => {
                sqlx::query(
                    "UPDATE workers SET username = $1, first_name = $2, last_name = $3, \
                     email = $4, position_id = $5, password_hash = $6 WHERE id = $7",
                )
                .bind(&profile.username)
                .bind(&profile.first_name)
                .bind(&profile.last_name)
                .bind(&profile.email)
                .bind(profile.position_id)
                .bind(hash)
                .bind(id)
                .execute(&self.pool)
                .await
            }
        };

        if result.map_err(map_unique_username)?.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_worker(id).await
    }

    async fn delete_worker(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM task_assignees WHERE worker_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn count_workers(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let (clause, _) = task_where(filter);
        let sql = format!("{}{} GROUP BY t.id{}", TASK_SELECT, clause, TASK_ORDER);

        let mut query = sqlx::query_as::<_, Task>(&sql);
        if let Some(term) = &filter.name_contains {
            query = query.bind(contains_pattern(term));
        }
        if let Some(is_completed) = filter.is_completed {
            query = query.bind(is_completed);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<usize> {
        let (clause, _) = task_where(filter);
        let sql = format!("SELECT COUNT(*) FROM tasks t{}", clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(term) = &filter.name_contains {
            query = query.bind(contains_pattern(term));
        }
        if let Some(is_completed) = filter.is_completed {
            query = query.bind(is_completed);
        }
        Ok(to_count(query.fetch_one(&self.pool).await?))
    }

    async fn task_window(
        &self,
        filter: &TaskFilter,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Task>> {
        let (clause, used) = task_where(filter);
        let sql = format!(
            "{}{} GROUP BY t.id{} LIMIT ${} OFFSET ${}",
            TASK_SELECT,
            clause,
            TASK_ORDER,
            used + 1,
            used + 2
        );

        let mut query = sqlx::query_as::<_, Task>(&sql);
        if let Some(term) = &filter.name_contains {
            query = query.bind(contains_pattern(term));
        }
        if let Some(is_completed) = filter.is_completed {
            query = query.bind(is_completed);
        }
        Ok(query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn dashboard_stats(&self, today: NaiveDate) -> StoreResult<DashboardStats> {
        let num_workers = self.count_workers().await?;

        // Urgent has no bucket.
        let (num_tasks, num_completed, high, medium, low): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), \
                 COUNT(*) FILTER (WHERE is_completed), \
                 COUNT(*) FILTER (WHERE priority = 'High'), \
                 COUNT(*) FILTER (WHERE priority = 'Medium'), \
                 COUNT(*) FILTER (WHERE priority = 'Low') \
                 FROM tasks",
            )
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "{} WHERE NOT t.is_completed \
             AND (t.deadline AT TIME ZONE 'UTC')::DATE BETWEEN $1 AND $2 \
             GROUP BY t.id ORDER BY t.deadline, t.id LIMIT $3",
            TASK_SELECT
        );
        let upcoming_deadlines = sqlx::query_as::<_, Task>(&sql)
            .bind(today)
            .bind(today + Duration::days(UPCOMING_WINDOW_DAYS))
            .bind(UPCOMING_LIMIT as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(DashboardStats {
            num_workers,
            num_tasks: to_count(num_tasks),
            num_completed_tasks: to_count(num_completed),
            upcoming_deadlines,
            priority: PriorityHistogram {
                high: to_count(high),
                medium: to_count(medium),
                low: to_count(low),
            },
        })
    }

    async fn get_task(&self, id: i64) -> StoreResult<Option<Task>> {
        let sql = format!("{} WHERE t.id = $1 GROUP BY t.id", TASK_SELECT);
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn tasks_assigned_to(&self, worker_id: i64) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "{} WHERE t.id IN (SELECT task_id FROM task_assignees WHERE worker_id = $1) \
             GROUP BY t.id{}",
            TASK_SELECT, TASK_ORDER
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO tasks (name, description, deadline, is_completed, priority, task_type_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.deadline)
        .bind(task.is_completed)
        .bind(task.priority)
        .bind(task.task_type_id)
        .fetch_one(&mut *tx)
        .await?;
        replace_assignees(&mut tx, id, &task.assignees).await?;
        tx.commit().await?;
        Ok(task.into_task(id))
    }

    async fn update_task(&self, id: i64, task: NewTask) -> StoreResult<Option<Task>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE tasks SET name = $1, description = $2, deadline = $3, is_completed = $4, \
             priority = $5, task_type_id = $6 WHERE id = $7",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.deadline)
        .bind(task.is_completed)
        .bind(task.priority)
        .bind(task.task_type_id)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }
        replace_assignees(&mut tx, id, &task.assignees).await?;
        tx.commit().await?;
        Ok(Some(task.into_task(id)))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }
}
