use crate::{
    auth::{
        password::reject_unknown_user, safe_redirect, verify_password, AuthResponse, LoginRequest,
        SESSION_COOKIE,
    },
    error::AppError,
    routes::{redirect, AppState},
};
use actix_web::{
    cookie::{time::Duration, Cookie},
    post, web, HttpResponse, Responder,
};
use validator::Validate;

/// Login
///
/// Authenticates a worker by username and password. The session token is
/// returned in the body and set as the `sessionid` cookie.
///
/// ## Responses:
/// - `200 OK`: `AuthResponse`, with `redirect_to` taken from a same-site `next`.
/// - `401 Unauthorized`: unknown username or wrong password.
/// - `422 Unprocessable Entity`: a field is missing.
#[post("/login/")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let worker = match state
        .store()
        .find_worker_by_username(&login_data.username)
        .await?
    {
        Some(worker) => worker,
        None => {
            reject_unknown_user(&login_data.password);
            log::info!("rejected login for unknown username");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    if !verify_password(&login_data.password, &worker.password_hash)? {
        log::info!("rejected login for {}", worker.username);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = state.auth.issue_token(worker.id)?;
    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .max_age(Duration::hours(state.auth.session_ttl_hours))
        .finish();
    log::info!("worker {} logged in", worker.username);

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        token,
        worker_id: worker.id,
        redirect_to: safe_redirect(login_data.next.as_deref()),
    }))
}

/// Logout
///
/// Clears the session cookie and redirects to the login URL.
#[post("/logout/")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    let mut response = redirect(&state.auth.login_url);
    if let Err(e) = response.add_cookie(&cookie) {
        log::error!("failed to clear session cookie: {}", e);
    }
    response
}
