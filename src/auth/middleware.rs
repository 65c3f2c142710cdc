use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Uri},
    Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{token::verify_token, AuthSettings};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

/// Recognizes the session on every request and, when login is required,
/// redirects anonymous callers to the login URL with a `next` parameter.
pub struct LoginRequired {
    settings: Rc<AuthSettings>,
}

impl LoginRequired {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            settings: Rc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoginRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = LoginRequiredService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRequiredService {
            service,
            settings: Rc::clone(&self.settings),
        }))
    }
}

pub struct LoginRequiredService<S> {
    service: S,
    settings: Rc<AuthSettings>,
}

impl<S, B> Service<ServiceRequest> for LoginRequiredService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authenticated = match session_token(&req) {
            Some(token) => match verify_token(&token, &self.settings.jwt_secret) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    true
                }
                Err(e) => {
                    log::debug!("ignoring session token: {}", e);
                    false
                }
            },
            None => false,
        };

        if authenticated || !self.settings.require_login || is_public(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        let location = login_redirect(&self.settings.login_url, req.uri());
        let (request, _) = req.into_parts();
        let response = HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish()
            .map_into_right_body();
        Box::pin(async move { Ok(ServiceResponse::new(request, response)) })
    }
}

// Health check and the account endpoints stay reachable without a session.
fn is_public(path: &str) -> bool {
    path == "/health" || path.starts_with("/accounts/")
}

/// Cookie first, then `Authorization: Bearer`.
fn session_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// `{login_url}?next={path and query}`, percent-encoded except for `/`.
pub fn login_redirect(login_url: &str, uri: &Uri) -> String {
    let requested = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let next = url::form_urlencoded::byte_serialize(requested.as_bytes())
        .collect::<String>()
        .replace("%2F", "/");
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{}{}next={}", login_url, separator, next)
}
