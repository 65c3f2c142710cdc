//! In-process store used by the test suite and when no `DATABASE_URL` is
//! configured. Data lives as long as the process.

use super::{Store, StoreResult, DUPLICATE_USERNAME};
use crate::error::AppError;
use crate::models::{NewTask, NewWorker, Position, Task, TaskType, Worker, WorkerUpdate};
use crate::query::{NameFilter, TaskFilter, WorkerFilter};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Sequences {
    position: i64,
    task_type: i64,
    worker: i64,
    task: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    positions: BTreeMap<i64, Position>,
    task_types: BTreeMap<i64, TaskType>,
    workers: BTreeMap<i64, NewWorker>,
    tasks: BTreeMap<i64, Task>,
}

impl Tables {
    fn worker(&self, id: i64, row: &NewWorker) -> Worker {
        Worker {
            id,
            username: row.username.clone(),
            password_hash: row.password_hash.clone(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
            position: row.position_id.and_then(|pid| self.positions.get(&pid).cloned()),
        }
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.workers
            .iter()
            .any(|(id, row)| row.username == username && Some(*id) != except)
    }

    fn check_references(&self, task: &NewTask) -> StoreResult<()> {
        if !self.task_types.contains_key(&task.task_type_id) {
            return Err(AppError::DatabaseError(format!(
                "task_type {} does not exist",
                task.task_type_id
            )));
        }
        if let Some(missing) = task.assignees.iter().find(|id| !self.workers.contains_key(id)) {
            return Err(AppError::DatabaseError(format!(
                "worker {} does not exist",
                missing
            )));
        }
        Ok(())
    }

    fn remove_worker(&mut self, id: i64) -> bool {
        for task in self.tasks.values_mut() {
            task.assignees.retain(|assignee| *assignee != id);
        }
        self.workers.remove(&id).is_some()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_positions(&self, filter: &NameFilter) -> StoreResult<Vec<Position>> {
        let tables = self.tables.read().await;
        Ok(tables
            .positions
            .values()
            .filter(|p| filter.matches(&p.name))
            .cloned()
            .collect())
    }

    async fn get_position(&self, id: i64) -> StoreResult<Option<Position>> {
        Ok(self.tables.read().await.positions.get(&id).cloned())
    }

    async fn create_position(&self, name: &str) -> StoreResult<Position> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.position);
        let position = Position {
            id,
            name: name.to_string(),
        };
        tables.positions.insert(id, position.clone());
        Ok(position)
    }

    async fn delete_position(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.positions.remove(&id).is_none() {
            return Ok(false);
        }
        let holders: Vec<i64> = tables
            .workers
            .iter()
            .filter(|(_, row)| row.position_id == Some(id))
            .map(|(worker_id, _)| *worker_id)
            .collect();
        for worker_id in holders {
            tables.remove_worker(worker_id);
        }
        Ok(true)
    }

    async fn list_task_types(&self, filter: &NameFilter) -> StoreResult<Vec<TaskType>> {
        let tables = self.tables.read().await;
        Ok(tables
            .task_types
            .values()
            .filter(|t| filter.matches(&t.name))
            .cloned()
            .collect())
    }

    async fn get_task_type(&self, id: i64) -> StoreResult<Option<TaskType>> {
        Ok(self.tables.read().await.task_types.get(&id).cloned())
    }

    async fn create_task_type(&self, name: &str) -> StoreResult<TaskType> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.task_type);
        let task_type = TaskType {
            id,
            name: name.to_string(),
        };
        tables.task_types.insert(id, task_type.clone());
        Ok(task_type)
    }

    async fn delete_task_type(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.task_types.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, task| task.task_type_id != id);
        Ok(true)
    }

    async fn list_workers(&self, filter: &WorkerFilter) -> StoreResult<Vec<Worker>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workers
            .iter()
            .map(|(id, row)| tables.worker(*id, row))
            .filter(|w| filter.matches(w))
            .collect())
    }

    async fn get_worker(&self, id: i64) -> StoreResult<Option<Worker>> {
        let tables = self.tables.read().await;
        Ok(tables.workers.get(&id).map(|row| tables.worker(id, row)))
    }

    async fn find_worker_by_username(&self, username: &str) -> StoreResult<Option<Worker>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workers
            .iter()
            .find(|(_, row)| row.username == username)
            .map(|(id, row)| tables.worker(*id, row)))
    }

    async fn create_worker(&self, worker: NewWorker) -> StoreResult<Worker> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&worker.username, None) {
            return Err(AppError::field("username", DUPLICATE_USERNAME));
        }
        let id = next(&mut tables.seq.worker);
        let created = tables.worker(id, &worker);
        tables.workers.insert(id, worker);
        Ok(created)
    }

    async fn update_worker(&self, id: i64, update: WorkerUpdate) -> StoreResult<Option<Worker>> {
        let mut tables = self.tables.write().await;
        if !tables.workers.contains_key(&id) {
            return Ok(None);
        }
        let profile = update.profile();
        if tables.username_taken(&profile.username, Some(id)) {
            return Err(AppError::field("username", DUPLICATE_USERNAME));
        }
        let Some(row) = tables.workers.get_mut(&id) else {
            return Ok(None);
        };
        row.username = profile.username.clone();
        row.first_name = profile.first_name.clone();
        row.last_name = profile.last_name.clone();
        row.email = profile.email.clone();
        row.position_id = profile.position_id;
        if let Some(hash) = update.password_hash() {
            row.password_hash = hash.to_string();
        }
        let row = row.clone();
        Ok(Some(tables.worker(id, &row)))
    }

    async fn delete_worker(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.remove_worker(id))
    }

    async fn count_workers(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.workers.len() as u64)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn tasks_assigned_to(&self, worker_id: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.assignees.contains(&worker_id))
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.check_references(&task)?;
        let id = next(&mut tables.seq.task);
        let task = task.into_task(id);
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i64, task: NewTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&id) {
            return Ok(None);
        }
        tables.check_references(&task)?;
        let task = task.into_task(id);
        tables.tasks.insert(id, task.clone());
        Ok(Some(task))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, WorkerProfile};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn new_worker(username: &str, position_id: Option<i64>) -> NewWorker {
        NewWorker {
            username: username.into(),
            password_hash: "hash".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position_id,
        }
    }

    fn new_task(name: &str, task_type_id: i64, assignees: Vec<i64>) -> NewTask {
        NewTask {
            name: name.into(),
            description: "Desc".into(),
            deadline: Utc::now() + Duration::days(1),
            is_completed: false,
            priority: Priority::Medium,
            task_type_id,
            assignees,
        }
    }

    #[actix_rt::test]
    async fn test_assignees_round_trip() {
        let store = MemoryStore::new();
        let bug = store.create_task_type("Bug").await.unwrap();
        let a = store.create_worker(new_worker("a", None)).await.unwrap();
        let b = store.create_worker(new_worker("b", None)).await.unwrap();

        let created = store
            .create_task(new_task("T", bug.id, vec![b.id, a.id]))
            .await
            .unwrap();
        let fetched = store.get_task(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.assignees, vec![a.id, b.id]);
    }

    #[actix_rt::test]
    async fn test_deleting_task_type_cascades_to_tasks() {
        let store = MemoryStore::new();
        let bug = store.create_task_type("Bug").await.unwrap();
        let feature = store.create_task_type("Feature").await.unwrap();
        store.create_task(new_task("b1", bug.id, vec![])).await.unwrap();
        store.create_task(new_task("b2", bug.id, vec![])).await.unwrap();
        let kept = store.create_task(new_task("f1", feature.id, vec![])).await.unwrap();

        assert!(store.delete_task_type(bug.id).await.unwrap());
        let remaining = store.list_tasks(&TaskFilter::default()).await.unwrap();
        assert_eq!(remaining, vec![kept]);
        assert!(!store.delete_task_type(bug.id).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_deleting_position_cascades_to_workers_and_assignments() {
        let store = MemoryStore::new();
        let dev = store.create_position("Developer").await.unwrap();
        let bug = store.create_task_type("Bug").await.unwrap();
        let gone = store.create_worker(new_worker("dev", Some(dev.id))).await.unwrap();
        let stays = store.create_worker(new_worker("free", None)).await.unwrap();
        let task = store
            .create_task(new_task("T", bug.id, vec![gone.id, stays.id]))
            .await
            .unwrap();

        assert!(store.delete_position(dev.id).await.unwrap());
        assert!(store.get_worker(gone.id).await.unwrap().is_none());
        assert_eq!(store.count_workers().await.unwrap(), 1);
        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.assignees, vec![stays.id]);
    }

    #[actix_rt::test]
    async fn test_deleting_worker_keeps_tasks() {
        let store = MemoryStore::new();
        let bug = store.create_task_type("Bug").await.unwrap();
        let w = store.create_worker(new_worker("w", None)).await.unwrap();
        let task = store.create_task(new_task("T", bug.id, vec![w.id])).await.unwrap();

        assert!(store.delete_worker(w.id).await.unwrap());
        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert!(task.assignees.is_empty());
    }

    #[actix_rt::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        store.create_worker(new_worker("dup", None)).await.unwrap();
        let other = store.create_worker(new_worker("other", None)).await.unwrap();
        assert!(matches!(
            store.create_worker(new_worker("dup", None)).await,
            Err(AppError::ValidationError(_))
        ));

        let rename = WorkerUpdate::Profile(WorkerProfile {
            username: "dup".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position_id: None,
        });
        assert!(store.update_worker(other.id, rename).await.is_err());
    }

    #[actix_rt::test]
    async fn test_profile_update_keeps_password() {
        let store = MemoryStore::new();
        let w = store.create_worker(new_worker("w", None)).await.unwrap();
        let profile = WorkerProfile {
            username: "w2".into(),
            first_name: "Jane".into(),
            last_name: String::new(),
            email: String::new(),
            position_id: None,
        };

        let updated = store
            .update_worker(w.id, WorkerUpdate::Profile(profile.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.username, "w2");
        assert_eq!(updated.password_hash, "hash");

        let updated = store
            .update_worker(
                w.id,
                WorkerUpdate::ProfileAndCredentials {
                    profile,
                    password_hash: "new-hash".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }

    #[actix_rt::test]
    async fn test_task_references_are_enforced() {
        let store = MemoryStore::new();
        assert!(store.create_task(new_task("T", 42, vec![])).await.is_err());
    }
}
