#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    test, web, App,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use taskflow::{
    auth::{AuthSettings, LoginRequired},
    models::{NewTask, NewWorker, Position, Priority, Task, TaskType, Worker},
    routes::{self, AppState},
    store::{MemoryStore, Store},
};

pub const SECRET: &str = "integration-test-secret";

pub fn settings(require_login: bool) -> AuthSettings {
    AuthSettings {
        jwt_secret: SECRET.to_string(),
        session_ttl_hours: 1,
        require_login,
        login_url: "/accounts/login/".to_string(),
    }
}

/// Fresh in-memory state. The returned store is the one the app uses, for
/// seeding and for checking what a request persisted.
pub fn state(require_login: bool) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), settings(require_login));
    (state, store)
}

pub async fn app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let auth = state.auth.clone();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(LoginRequired::new(auth))
            .configure(routes::config),
    )
    .await
}

pub fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub fn in_days(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

pub async fn position(store: &MemoryStore, name: &str) -> Position {
    store.create_position(name).await.unwrap()
}

pub async fn task_type(store: &MemoryStore, name: &str) -> TaskType {
    store.create_task_type(name).await.unwrap()
}

/// Seeds a worker that cannot log in. Use `hash_password` for one that can.
pub async fn worker(store: &MemoryStore, username: &str, position: Option<&Position>) -> Worker {
    worker_with_hash(store, username, "not-a-bcrypt-hash", position).await
}

pub async fn worker_with_hash(
    store: &MemoryStore,
    username: &str,
    password_hash: &str,
    position: Option<&Position>,
) -> Worker {
    store
        .create_worker(NewWorker {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position_id: position.map(|p| p.id),
        })
        .await
        .unwrap()
}

pub struct TaskSeed<'a> {
    pub name: &'a str,
    pub deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub priority: Priority,
    pub assignees: Vec<i64>,
}

impl<'a> TaskSeed<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            deadline: in_days(30),
            is_completed: false,
            priority: Priority::Medium,
            assignees: Vec::new(),
        }
    }
}

pub async fn task(store: &MemoryStore, task_type: &TaskType, seed: TaskSeed<'_>) -> Task {
    store
        .create_task(NewTask {
            name: seed.name.to_string(),
            description: format!("{} description", seed.name),
            deadline: seed.deadline,
            is_completed: seed.is_completed,
            priority: seed.priority,
            task_type_id: task_type.id,
            assignees: seed.assignees,
        })
        .await
        .unwrap()
}
