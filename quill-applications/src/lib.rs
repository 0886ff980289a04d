//! Quill Applications - access control and moderation for the notes and news sites
//!
//! This crate holds the rules that decide who may see and change what:
//!
//! - **Notes** ([`notes`]): every note is private to its author; non-owners see
//!   "not found", never "forbidden"
//! - **News** ([`news`]): public news items with a moderated comment thread,
//!   comments editable and deletable only by their authors
//! - **Auth** ([`auth`]): the per-request identity and the ownership gate
//!
//! ## Architecture
//!
//! - **Core** (quill-core): domain types, configuration, logging
//! - **Applications** (this crate): services over pluggable storage backends
//! - **Presentation** (quill-web): HTTP routing, sessions, page contexts

pub mod auth;
pub mod news;
pub mod notes;
pub mod storage;

pub use auth::{can_delete, can_edit, IdentityContext, Owned};
pub use news::{CommentForm, MemoryNewsStorage, NewsService, NewsStorage};
pub use notes::{MemoryNoteStorage, NoteForm, NoteService, NoteStorage};
pub use storage::{StorageError, StorageResult};

#[cfg(feature = "sqlite")]
pub use news::SqliteNewsStorage;
#[cfg(feature = "sqlite")]
pub use notes::SqliteNoteStorage;

use quill_core::QuillConfig;
use std::sync::Arc;
use tracing::info;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// A submitted field was rejected; nothing was written.
    #[error("Validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Missing record, or a record owned by someone else.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Authentication required: {operation}")]
    AuthenticationRequired { operation: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a field validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an authentication required error
    pub fn authentication_required<S: Into<String>>(operation: S) -> Self {
        Self::AuthenticationRequired {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Field name for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    /// SQLite URL; in-memory storage when `None`
    pub database_url: Option<String>,
    /// Number of news items on the news home page
    pub home_page_count: usize,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            home_page_count: 10,
        }
    }
}

impl From<&QuillConfig> for ApplicationConfig {
    fn from(config: &QuillConfig) -> Self {
        Self {
            database_url: config.storage.database_url.clone(),
            home_page_count: config.news.home_page_count,
        }
    }
}

/// Both sites' services behind one handle
#[derive(Clone)]
pub struct QuillApplication {
    pub notes: NoteService,
    pub news: NewsService,
    #[cfg(feature = "sqlite")]
    pool: Option<sqlx::SqlitePool>,
}

impl QuillApplication {
    /// Build services over the storage backend selected by `config`
    pub async fn new(config: ApplicationConfig) -> ApplicationResult<Self> {
        if config.home_page_count == 0 {
            return Err(ApplicationError::config(
                "home_page_count must be greater than 0",
            ));
        }

        match config.database_url.as_deref() {
            #[cfg(feature = "sqlite")]
            Some(url) => Self::with_sqlite(url, config.home_page_count).await,
            #[cfg(not(feature = "sqlite"))]
            Some(url) => Err(ApplicationError::config(format!(
                "database_url '{}' requires the sqlite feature",
                url
            ))),
            None => Ok(Self::in_memory(config.home_page_count)),
        }
    }

    /// In-memory services, used by default and in tests
    pub fn in_memory(home_page_count: usize) -> Self {
        info!("Using in-memory storage");
        Self {
            notes: NoteService::new(Arc::new(MemoryNoteStorage::new())),
            news: NewsService::new(Arc::new(MemoryNewsStorage::new()), home_page_count),
            #[cfg(feature = "sqlite")]
            pool: None,
        }
    }

    /// SQLite-backed services sharing one connection pool
    #[cfg(feature = "sqlite")]
    pub async fn with_sqlite(database_url: &str, home_page_count: usize) -> ApplicationResult<Self> {
        let pool = storage::connect_sqlite(database_url).await?;

        let notes = SqliteNoteStorage::new(pool.clone());
        notes.create_tables().await?;
        let news = SqliteNewsStorage::new(pool.clone());
        news.create_tables().await?;

        info!("Using SQLite storage at {}", database_url);
        Ok(Self {
            notes: NoteService::new(Arc::new(notes)),
            news: NewsService::new(Arc::new(news), home_page_count),
            pool: Some(pool),
        })
    }

    /// The shared pool, when running on SQLite
    #[cfg(feature = "sqlite")]
    pub fn sqlite_pool(&self) -> Option<&sqlx::SqlitePool> {
        self.pool.as_ref()
    }

    /// Check both storage backends
    pub async fn health_check(&self) -> ApplicationResult<()> {
        self.notes.health_check().await?;
        self.news.health_check().await?;
        Ok(())
    }
}
