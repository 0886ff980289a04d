//! Test harness: drives the router in-process with `oneshot`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{
        header::{HeaderName, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use quill_applications::IdentityContext;
use quill_core::UserId;
use quill_web::{create_app, AppState, WebConfig};
use serde_json::Value;
use std::sync::LazyLock;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

// Install the subscriber once per test binary
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// A response with its body already read
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// Logged-in user: the cookie to send and the id behind it
#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub id: UserId,
    pub cookie: String,
}

impl TestUser {
    pub fn identity(&self) -> IdentityContext {
        IdentityContext::authenticated(self.id.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);
    let state = AppState::in_memory();
    TestApp {
        router: create_app(state.clone()),
        state,
    }
}

/// App over a SQLite file inside `dir`
pub async fn spawn_sqlite_app(dir: &tempfile::TempDir) -> TestApp {
    LazyLock::force(&TRACING);
    let path = dir.path().join("quill.db");
    let config = WebConfig {
        database_url: Some(format!("sqlite://{}", path.display())),
        ..WebConfig::default()
    };
    let state = AppState::new(config).await.expect("Failed to build app state");
    TestApp {
        router: create_app(state.clone()),
        state,
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        form: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("Failed to build request"))
            .await
            .expect("Failed to execute request.");

        let status = response.status();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let location = header(LOCATION);
        let set_cookie = header(SET_COOKIE);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            location,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, user: Option<&TestUser>) -> TestResponse {
        self.request(Method::GET, uri, user.map(|u| u.cookie.as_str()), None)
            .await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        user: Option<&TestUser>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        self.request(
            Method::POST,
            uri,
            user.map(|u| u.cookie.as_str()),
            Some(encode_form(fields)),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, user: Option<&TestUser>) -> TestResponse {
        self.request(Method::DELETE, uri, user.map(|u| u.cookie.as_str()), None)
            .await
    }

    /// Sign up through the HTTP form and keep the session cookie
    pub async fn signup(&self, username: &str) -> TestUser {
        let response = self
            .post_form(
                "/auth/signup/",
                None,
                &[
                    ("username", username),
                    ("password1", PASSWORD),
                    ("password2", PASSWORD),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::FOUND, "signup failed: {:?}", response.body);

        let cookie = session_cookie(&response).expect("signup did not set a session cookie");
        let user = self
            .state
            .users
            .get_user_by_username(username)
            .await
            .expect("Failed to load user")
            .expect("user was not stored");

        TestUser {
            username: username.to_string(),
            id: user.id,
            cookie,
        }
    }
}

/// `name=value` part of a `Set-Cookie` header
pub fn session_cookie(response: &TestResponse) -> Option<String> {
    response
        .set_cookie
        .as_deref()
        .and_then(|header| header.split(';').next())
        .map(str::to_string)
}
