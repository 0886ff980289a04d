//! HTTP request handlers for the notes and news sites
//!
//! Pages answer with JSON page contexts; successful form submissions answer
//! with `302 Found`.

pub mod health;
pub mod news;
pub mod notes;
pub mod types;

pub use health::*;
pub use types::*;

use crate::WebError;
use axum::{
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
};

/// `302 Found` to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Numeric path segment; anything else is a missing page
pub fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse::<i64>()
        .map_err(|_| WebError::NotFound(format!("no page at id '{}'", raw)))
}

/// Fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound("page".to_string())
}
