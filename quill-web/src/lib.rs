//! Quill Web Server
//!
//! HTTP surface for the notes and news sites: routing, sessions and the mapping
//! from application outcomes to redirects, re-renders and not-found pages.

pub mod auth;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::QuillServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use handlers::ErrorResponse;
use quill_applications::{ApplicationConfig, ApplicationError};
use quill_core::QuillConfig;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    routes::all_routes()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// SQLite URL for notes, news and accounts; in-memory when `None`
    pub database_url: Option<String>,
    /// News items shown on the news home page
    pub home_page_count: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: None,
            home_page_count: 10,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Settings from a loaded `quill.toml`
    pub fn from_quill_config(config: &QuillConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            database_url: config.storage.database_url.clone(),
            home_page_count: config.news.home_page_count,
        }
    }

    /// Apply `QUILL_HOST`, `QUILL_PORT` and `DATABASE_URL` on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("QUILL_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("QUILL_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid QUILL_PORT '{}'", port),
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        self
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn application_config(&self) -> ApplicationConfig {
        ApplicationConfig {
            database_url: self.database_url.clone(),
            home_page_count: self.home_page_count,
        }
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

fn error_body(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
        .into_response()
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound(what) => {
                error_body(StatusCode::NOT_FOUND, "not_found", format!("No {} here", what))
            }
            WebError::Auth(err) => err.into_response(),
            WebError::Application(err) => match err {
                ApplicationError::NotFound { resource } => error_body(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("No {} here", resource),
                ),
                ApplicationError::AuthenticationRequired { .. } => {
                    handlers::found(auth::LOGIN_URL)
                }
                ApplicationError::Validation { field, message } => error_body(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("{}: {}", field, message),
                ),
                other => {
                    error!("Request failed: {}", other);
                    error_body(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "Internal server error".to_string(),
                    )
                }
            },
            other => {
                error!("Request failed: {}", other);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
