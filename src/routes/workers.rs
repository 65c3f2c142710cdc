use crate::{
    auth::{hash_password, CurrentWorker},
    error::AppError,
    forms::{WorkerCreationForm, WorkerProfileForm},
    models::{NewWorker, Position, Task, Worker, WorkerUpdate},
    query::{self, CatalogParams, WorkerListParams},
    routes::{found, redirect, AppState},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Serialize;

const WORKER_LIST_URL: &str = "/workers/";

/// A worker with the tasks assigned to them.
#[derive(Debug, Serialize)]
pub struct WorkerDetail {
    #[serde(flatten)]
    pub worker: Worker,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct WorkerFormChoices {
    pub positions: Vec<Position>,
}

async fn load_worker(state: &AppState, id: i64) -> Result<Worker, AppError> {
    found(state.store().get_worker(id).await?, "Worker")
}

/// Lists workers.
///
/// ## Query Parameters:
/// - `username` (optional): case-insensitive substring of the username.
/// - `page` (optional): page number or `last`.
///
/// ## Responses:
/// - `200 OK`: one page of workers, five per page, ordered by username.
/// - `404 Not Found`: the requested page does not exist.
#[get("/")]
pub async fn list_workers(
    state: web::Data<AppState>,
    params: web::Query<WorkerListParams>,
) -> Result<impl Responder, AppError> {
    let page = query::worker_page(state.store(), &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/create/")]
pub async fn create_worker_form(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let positions = query::position_list(state.store(), &CatalogParams::default()).await?;
    Ok(HttpResponse::Ok().json(WorkerFormChoices { positions }))
}

/// Creates a worker account and redirects to the worker list.
///
/// ## Responses:
/// - `302 Found`: created; `Location: /workers/`.
/// - `422 Unprocessable Entity`: e.g. a taken username or mismatched passwords.
#[post("/create/")]
pub async fn create_worker(
    state: web::Data<AppState>,
    form: web::Json<WorkerCreationForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let cleaned = form.clean(state.store(), None).await?;
    let password_hash = hash_password(&cleaned.password)?;
    let profile = cleaned.profile;

    let worker = state
        .store()
        .create_worker(NewWorker {
            username: profile.username,
            password_hash,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            position_id: profile.position_id,
        })
        .await?;
    log::info!("worker {} ({}) created by {:?}", worker.id, worker.username, actor);
    Ok(redirect(WORKER_LIST_URL))
}

/// Worker detail, including every task the worker is assigned to.
#[get("/{id}/")]
pub async fn get_worker(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let worker = load_worker(&state, id.into_inner()).await?;
    let mut tasks = state.store().tasks_assigned_to(worker.id).await?;
    tasks.sort_by(query::ordering::task_default);
    Ok(HttpResponse::Ok().json(WorkerDetail { worker, tasks }))
}

#[get("/{id}/update/")]
pub async fn update_worker_form(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(load_worker(&state, id.into_inner()).await?))
}

/// Updates the profile fields only. A password in the body is ignored.
#[post("/{id}/update/")]
pub async fn update_worker(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Json<WorkerProfileForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    load_worker(&state, id).await?;
    let profile = form.clean(state.store(), Some(id)).await?;
    found(
        state
            .store()
            .update_worker(id, WorkerUpdate::Profile(profile))
            .await?,
        "Worker",
    )?;
    log::info!("worker {} profile updated by {:?}", id, actor);
    Ok(redirect(WORKER_LIST_URL))
}

/// Updates the profile and replaces the password.
#[post("/{id}/update/credentials/")]
pub async fn update_worker_credentials(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Json<WorkerCreationForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    load_worker(&state, id).await?;
    let cleaned = form.clean(state.store(), Some(id)).await?;
    let update = WorkerUpdate::ProfileAndCredentials {
        profile: cleaned.profile,
        password_hash: hash_password(&cleaned.password)?,
    };
    found(state.store().update_worker(id, update).await?, "Worker")?;
    log::info!("worker {} profile and credentials updated by {:?}", id, actor);
    Ok(redirect(WORKER_LIST_URL))
}

#[get("/{id}/delete/")]
pub async fn delete_worker_confirm(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(load_worker(&state, id.into_inner()).await?))
}

/// Deletes a worker. Their tasks remain, minus this assignee.
#[post("/{id}/delete/")]
pub async fn delete_worker(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    if !state.store().delete_worker(id).await? {
        return Err(AppError::NotFound("Worker not found".into()));
    }
    log::info!("worker {} deleted by {:?}", id, actor);
    Ok(redirect(WORKER_LIST_URL))
}
