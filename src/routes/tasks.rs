use crate::{
    auth::CurrentWorker,
    error::AppError,
    forms::TaskForm,
    models::{Priority, Task, TaskType, Worker},
    query::{self, CatalogParams, TaskListParams, WorkerFilter},
    routes::{found, redirect, AppState},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Serialize;

const TASK_LIST_URL: &str = "/tasks/";

/// A task with its type and assignees resolved.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub task_type: Option<TaskType>,
    pub workers: Vec<Worker>,
}

/// Choices offered by the task form.
#[derive(Debug, Serialize)]
pub struct TaskFormChoices {
    pub priorities: Vec<&'static str>,
    pub task_types: Vec<TaskType>,
    pub workers: Vec<Worker>,
}

async fn form_choices(state: &AppState) -> Result<TaskFormChoices, AppError> {
    let task_types = query::task_type_list(state.store(), &CatalogParams::default()).await?;
    let mut workers = state.store().list_workers(&WorkerFilter::default()).await?;
    workers.sort_by(query::ordering::worker_default);
    Ok(TaskFormChoices {
        priorities: Priority::ALL.iter().map(Priority::as_str).collect(),
        task_types,
        workers,
    })
}

async fn load_task(state: &AppState, id: i64) -> Result<Task, AppError> {
    found(state.store().get_task(id).await?, "Task")
}

/// Lists tasks.
///
/// ## Query Parameters:
/// - `name` (optional): case-insensitive substring of the task name.
/// - `status` (optional): `completed` or `pending`; anything else is ignored.
/// - `page` (optional): page number or `last`.
///
/// ## Responses:
/// - `200 OK`: one page of tasks, five per page, ordered by deadline then priority.
/// - `404 Not Found`: the requested page does not exist.
#[get("/")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    params: web::Query<TaskListParams>,
) -> Result<impl Responder, AppError> {
    let page = query::task_page(state.store(), &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/create/")]
pub async fn create_task_form(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(form_choices(&state).await?))
}

/// Creates a task and redirects to the task list.
///
/// ## Responses:
/// - `302 Found`: created; `Location: /tasks/`.
/// - `422 Unprocessable Entity`: `{"errors": {field: message}}`.
#[post("/create/")]
pub async fn create_task(
    state: web::Data<AppState>,
    form: web::Json<TaskForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let new_task = form.clean(state.store()).await?;
    let task = state.store().create_task(new_task).await?;
    log::info!("task {} created by {:?}", task.id, actor);
    Ok(redirect(TASK_LIST_URL))
}

/// Task detail with the task type and assigned workers resolved.
#[get("/{id}/")]
pub async fn get_task(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = load_task(&state, id.into_inner()).await?;
    let task_type = state.store().get_task_type(task.task_type_id).await?;

    let mut workers = Vec::with_capacity(task.assignees.len());
    for worker_id in &task.assignees {
        if let Some(worker) = state.store().get_worker(*worker_id).await? {
            workers.push(worker);
        }
    }

    Ok(HttpResponse::Ok().json(TaskDetail {
        task,
        task_type,
        workers,
    }))
}

#[get("/{id}/update/")]
pub async fn update_task_form(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(load_task(&state, id.into_inner()).await?))
}

/// Replaces every field of a task, assignees included.
#[post("/{id}/update/")]
pub async fn update_task(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Json<TaskForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    load_task(&state, id).await?;
    let changes = form.clean(state.store()).await?;
    found(state.store().update_task(id, changes).await?, "Task")?;
    log::info!("task {} updated by {:?}", id, actor);
    Ok(redirect(TASK_LIST_URL))
}

/// Returns the task about to be deleted.
#[get("/{id}/delete/")]
pub async fn delete_task_confirm(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(load_task(&state, id.into_inner()).await?))
}

#[post("/{id}/delete/")]
pub async fn delete_task(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    if !state.store().delete_task(id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    log::info!("task {} deleted by {:?}", id, actor);
    Ok(redirect(TASK_LIST_URL))
}
