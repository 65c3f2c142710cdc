use crate::{error::AppError, query, routes::AppState};
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;

/// Dashboard
///
/// Worker and task totals, the next upcoming deadlines and the priority
/// histogram, computed for the current UTC date.
#[get("/")]
pub async fn index(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let today = Utc::now().date_naive();
    let stats = query::dashboard(state.store(), today).await?;
    Ok(HttpResponse::Ok().json(stats))
}
