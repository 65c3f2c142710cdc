pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::CurrentWorker;
pub use middleware::{LoginRequired, SESSION_COOKIE};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Everything the session gate needs, resolved once from `Config`.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// When false every route is public; a valid session is still recognized.
    pub require_login: bool,
    pub login_url: String,
}

impl AuthSettings {
    pub fn issue_token(&self, worker_id: i64) -> Result<String, crate::error::AppError> {
        generate_token(worker_id, &self.jwt_secret, self.session_ttl_hours)
    }
}

/// Represents the payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    /// Where to go after logging in, as carried by the `next` parameter.
    #[serde(default)]
    pub next: Option<String>,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The session token, also set as the `sessionid` cookie.
    pub token: String,
    pub worker_id: i64,
    pub redirect_to: String,
}

const REDIRECT_BASE: &str = "http://taskflow.invalid/";

/// Only same-site paths are followed; anything else goes to the dashboard.
///
/// Browsers read a backslash as `/` and drop tabs and newlines inside URLs, so a
/// path containing either is refused outright. What remains must resolve to
/// the same host when joined onto a base URL.
pub fn safe_redirect(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") {
        return false;
    }
    if path.contains('\\') || path.chars().any(|c| c.is_ascii_control()) {
        return false;
    }
    let base = match url::Url::parse(REDIRECT_BASE) {
        Ok(base) => base,
        Err(_) => return false,
    };
    match base.join(path) {
        Ok(joined) => joined.host_str() == base.host_str(),
        Err(_) => false,
    }
}
