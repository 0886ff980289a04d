//! Sessions, accounts and the identity extractors

#[cfg(feature = "sqlite")]
pub mod database;
pub mod handlers;
pub mod jwt;
pub mod users;


use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use quill_applications::IdentityContext;
use std::convert::Infallible;
use tracing::debug;

pub use jwt::{AuthError, Claims, JwtService};
pub use users::{UserData, UserStore};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "quill_session";

pub const LOGIN_URL: &str = "/auth/login/";

/// Login location that returns to `next` afterwards
pub fn login_url(next: &str) -> String {
    format!(
        "{}?next={}",
        LOGIN_URL,
        urlencoding::encode(next).replace("%2F", "/")
    )
}

/// Only local absolute paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Session token from the cookie, falling back to a bearer header
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Resolve the caller. Missing, invalid and expired tokens all mean anonymous.
pub fn identity_from_headers(headers: &HeaderMap) -> IdentityContext {
    let Some(token) = session_token(headers) else {
        return IdentityContext::anonymous();
    };

    match JwtService::verify_token(&token) {
        Ok(claims) => IdentityContext::authenticated(claims.user_id()),
        Err(e) => {
            debug!("Ignoring session token: {}", e);
            IdentityContext::anonymous()
        }
    }
}

/// Identity of the caller, anonymous or not
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub IdentityContext);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentIdentity(identity_from_headers(&parts.headers)))
    }
}

/// Authenticated caller; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct LoginRequired(pub IdentityContext);

impl<S> FromRequestParts<S> for LoginRequired
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers);
        if identity.is_anonymous() {
            let next = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string());
            debug!("Anonymous request to {} needs a login", next);
            return Err(LoginRedirect { next });
        }

        Ok(LoginRequired(identity))
    }
}

/// Redirect to the login page, remembering where to come back to
#[derive(Debug)]
pub struct LoginRedirect {
    pub next: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        crate::handlers::found(&login_url(&self.next))
    }
}
