//! Positions and task types: list, create, delete.
//!
//! Deletion cascades (a position takes its workers with it, a task type its
//! tasks), so both delete routes are POST only.

use crate::{
    auth::CurrentWorker,
    error::AppError,
    forms::{PositionForm, TaskTypeForm},
    query::{self, CatalogParams},
    routes::{redirect, AppState},
};
use actix_web::{get, post, web, HttpResponse, Responder};

const POSITION_LIST_URL: &str = "/positions/";
const TASK_TYPE_LIST_URL: &str = "/task-types/";

#[get("/")]
pub async fn list_positions(
    state: web::Data<AppState>,
    params: web::Query<CatalogParams>,
) -> Result<impl Responder, AppError> {
    let positions = query::position_list(state.store(), &params).await?;
    Ok(HttpResponse::Ok().json(positions))
}

#[post("/create/")]
pub async fn create_position(
    state: web::Data<AppState>,
    form: web::Json<PositionForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let name = form.clean()?;
    let position = state.store().create_position(&name).await?;
    log::info!("position {} ({}) created by {:?}", position.id, position.name, actor);
    Ok(redirect(POSITION_LIST_URL))
}

#[post("/{id}/delete/")]
pub async fn delete_position(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    if !state.store().delete_position(id).await? {
        return Err(AppError::NotFound("Position not found".into()));
    }
    log::info!("position {} and its workers deleted by {:?}", id, actor);
    Ok(redirect(POSITION_LIST_URL))
}

#[get("/")]
pub async fn list_task_types(
    state: web::Data<AppState>,
    params: web::Query<CatalogParams>,
) -> Result<impl Responder, AppError> {
    let task_types = query::task_type_list(state.store(), &params).await?;
    Ok(HttpResponse::Ok().json(task_types))
}

#[post("/create/")]
pub async fn create_task_type(
    state: web::Data<AppState>,
    form: web::Json<TaskTypeForm>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let name = form.clean()?;
    let task_type = state.store().create_task_type(&name).await?;
    log::info!("task type {} ({}) created by {:?}", task_type.id, task_type.name, actor);
    Ok(redirect(TASK_TYPE_LIST_URL))
}

#[post("/{id}/delete/")]
pub async fn delete_task_type(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    actor: Option<CurrentWorker>,
) -> Result<impl Responder, AppError> {
    let id = id.into_inner();
    if !state.store().delete_task_type(id).await? {
        return Err(AppError::NotFound("Task type not found".into()));
    }
    log::info!("task type {} and its tasks deleted by {:?}", id, actor);
    Ok(redirect(TASK_TYPE_LIST_URL))
}
