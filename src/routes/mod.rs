pub mod accounts;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod tasks;
pub mod workers;

use crate::auth::AuthSettings;
use crate::error::AppError;
use crate::store::Store;
use actix_web::{http::header, web, HttpResponse};
use std::sync::Arc;

/// Shared by every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: AuthSettings) -> Self {
        Self { store, auth }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// `302 Found` to `location`, the answer to every successful mutation.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn found<T>(entity: Option<T>, what: &str) -> Result<T, AppError> {
    entity.ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}

/// Routes with a literal segment (`create/`) are registered before the
/// `{id}` routes they would otherwise collide with.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(dashboard::index)
        .service(
            web::scope("/accounts")
                .service(accounts::login)
                .service(accounts::logout),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task_form)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task_form)
                .service(tasks::update_task)
                .service(tasks::delete_task_confirm)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/workers")
                .service(workers::list_workers)
                .service(workers::create_worker_form)
                .service(workers::create_worker)
                .service(workers::get_worker)
                .service(workers::update_worker_form)
                .service(workers::update_worker)
                .service(workers::update_worker_credentials)
                .service(workers::delete_worker_confirm)
                .service(workers::delete_worker),
        )
        .service(
            web::scope("/positions")
                .service(catalog::list_positions)
                .service(catalog::create_position)
                .service(catalog::delete_position),
        )
        .service(
            web::scope("/task-types")
                .service(catalog::list_task_types)
                .service(catalog::create_task_type)
                .service(catalog::delete_task_type),
        );
}
