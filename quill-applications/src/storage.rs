//! Storage errors and the shared SQLite connection helper
//!
//! Notes and news each define their own storage trait; both report failures
//! through [`StorageError`] and may share one SQLite pool.

use thiserror::Error;

/// Storage operation result type
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Another note already uses this slug
    #[error("Slug already in use: {slug}")]
    SlugTaken { slug: String },

    /// Record not found
    #[error("Record not found: {resource}")]
    NotFound { resource: String },

    /// Backend failure (connection, query, row decoding)
    #[error("Storage backend error in {component}: {message}")]
    Backend {
        message: String,
        component: String,
        error_id: String,
    },
}

impl StorageError {
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Backend failure tagged with a fresh error id for log correlation
    pub fn backend<M: Into<String>>(component: &str, message: M) -> Self {
        Self::Backend {
            message: message.into(),
            component: component.to_string(),
            error_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Open a SQLite pool, creating the database file if needed.
///
/// In-memory databases are per connection, so those pools hold exactly one.
#[cfg(feature = "sqlite")]
pub async fn connect_sqlite(database_url: &str) -> StorageResult<sqlx::SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            StorageError::backend(
                "sqlite_storage",
                format!("Invalid SQLite URL '{}': {}", database_url, e),
            )
        })?
        .create_if_missing(true)
        .foreign_keys(true);

    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            StorageError::backend(
                "sqlite_storage",
                format!("Failed to connect to SQLite database: {}", e),
            )
        })?;

    tracing::debug!(
        "Connected to SQLite at {} ({} connections)",
        database_url,
        max_connections
    );
    Ok(pool)
}

/// Map a sqlx error, turning unique-constraint violations into [`StorageError::SlugTaken`]
#[cfg(feature = "sqlite")]
pub(crate) fn map_write_error(err: sqlx::Error, slug: &str, action: &str) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StorageError::SlugTaken {
                slug: slug.to_string(),
            };
        }
    }
    StorageError::backend("sqlite_storage", format!("Failed to {}: {}", action, err))
}
