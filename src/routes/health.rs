use crate::routes::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Reports liveness, whether logins are enforced, and the current timestamp.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "require_login": state.auth.require_login,
        "timestamp": Utc::now()
    }))
}
