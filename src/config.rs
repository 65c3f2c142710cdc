use crate::auth::AuthSettings;
use crate::error::AppError;
use std::env;

pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";
/// Sessions last at most a year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

pub struct Config {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub require_login: bool,
    pub login_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".into()))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| AppError::InternalServerError("SERVER_PORT must be a number".into()))?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            session_ttl_hours: parse_session_ttl(
                &env::var("SESSION_TTL_HOURS").unwrap_or_else(|_| "24".to_string()),
            )?,
            require_login: parse_flag(env::var("REQUIRE_LOGIN").ok().as_deref(), true),
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            session_ttl_hours: self.session_ttl_hours,
            require_login: self.require_login,
            login_url: self.login_url.clone(),
        }
    }
}

fn parse_session_ttl(value: &str) -> Result<i64, AppError> {
    let hours: i64 = value.trim().parse().map_err(|_| {
        AppError::InternalServerError("SESSION_TTL_HOURS must be a number".into())
    })?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(AppError::InternalServerError(format!(
            "SESSION_TTL_HOURS must be between 1 and {}",
            MAX_SESSION_TTL_HOURS
        )));
    }
    Ok(hours)
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
