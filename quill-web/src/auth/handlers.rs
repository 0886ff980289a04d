//! Signup, login and logout pages

use super::{
    jwt::{AuthError, JwtService},
    safe_next,
    users::{password_problem, username_problem, UserData},
    CurrentIdentity, SESSION_COOKIE,
};
use crate::handlers::{found, FieldErrors};
use crate::{AppState, WebResult};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

const BAD_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const PASSWORD_MISMATCH: &str = "The two password fields didn\u{2019}t match.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Signup or login page
#[derive(Debug, Serialize)]
pub struct AccountPage<F: Serialize> {
    pub form: F,
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<F: Serialize> AccountPage<F> {
    fn new(form: F, next: Option<String>) -> Self {
        Self {
            form,
            errors: FieldErrors::new(),
            next,
        }
    }

    fn with_error(mut self, field: &str, message: &str) -> Self {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoggedOutPage {
    pub logged_out: bool,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn start_session(jar: CookieJar, user: &UserData, location: &str) -> WebResult<Response> {
    let token = JwtService::generate_session_token(&user.id, &user.username)?;
    Ok((jar.add(session_cookie(token)), found(location)).into_response())
}

#[utoipa::path(get, path = "/auth/signup/", tag = "Accounts",
    responses((status = 200, description = "Empty signup form")))]
pub async fn signup_page() -> Json<AccountPage<SignupForm>> {
    Json(AccountPage::new(SignupForm::default(), None))
}

#[utoipa::path(post, path = "/auth/signup/", tag = "Accounts",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Account created and logged in"),
        (status = 200, description = "Form re-rendered with field errors")
    ))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> WebResult<Response> {
    let username = form.username.trim().to_string();

    let page = AccountPage::new(
        SignupForm {
            username: username.clone(),
            ..SignupForm::default()
        },
        None,
    );
    if let Some(problem) = username_problem(&username) {
        return Ok(Json(page.with_error("username", problem)).into_response());
    }
    if let Some(problem) = password_problem(&form.password1) {
        return Ok(Json(page.with_error("password1", problem)).into_response());
    }
    if form.password1 != form.password2 {
        return Ok(Json(page.with_error("password2", PASSWORD_MISMATCH)).into_response());
    }

    match state.users.register(&username, &form.password1).await {
        Ok(user) => {
            info!("User signed up: {}", user.username);
            start_session(jar, &user, "/")
        }
        Err(AuthError::UsernameTaken) => {
            Ok(Json(page.with_error("username", USERNAME_TAKEN)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(get, path = "/auth/login/", tag = "Accounts",
    params(("next" = Option<String>, Query, description = "Where to go after logging in")),
    responses((status = 200, description = "Empty login form")))]
pub async fn login_page(Query(params): Query<NextParam>) -> Json<AccountPage<LoginForm>> {
    Json(AccountPage::new(LoginForm::default(), params.next))
}

#[utoipa::path(post, path = "/auth/login/", tag = "Accounts",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged in, redirected to `next`"),
        (status = 200, description = "Form re-rendered with an error")
    ))]
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<NextParam>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let next = form.next.clone().or(params.next);
    let username = form.username.trim();

    match state.users.authenticate(username, &form.password).await {
        Ok(user) => {
            info!("User logged in: {}", user.username);
            start_session(jar, &user, safe_next(next.as_deref()))
        }
        Err(AuthError::InvalidCredentials) | Err(AuthError::MissingCredentials) => {
            let page = AccountPage::new(
                LoginForm {
                    username: username.to_string(),
                    ..LoginForm::default()
                },
                next,
            );
            Ok(Json(page.with_error("__all__", BAD_LOGIN)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(get, path = "/auth/logout/", tag = "Accounts",
    responses((status = 200, description = "Session cleared")))]
pub async fn logout(CurrentIdentity(identity): CurrentIdentity, jar: CookieJar) -> Response {
    if !identity.is_anonymous() {
        info!("Logging out {}", identity);
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(LoggedOutPage { logged_out: true })).into_response()
}
