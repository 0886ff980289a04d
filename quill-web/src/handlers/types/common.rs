//! Types shared by several pages

use quill_applications::ApplicationError;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Error messages keyed by form field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Field errors carried by a validation failure
pub fn field_errors(err: &ApplicationError) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let ApplicationError::Validation { field, message } = err {
        errors.insert(field.clone(), vec![message.clone()]);
    }
    errors
}

/// Error body for 404 and 5xx responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "not_found")]
    pub error: String,
    pub message: String,
}
