//! Shared application state

use crate::{auth::UserStore, WebConfig, WebError, WebResult};
use quill_applications::QuillApplication;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "sqlite")]
use crate::auth::database::DatabaseUserStore;

#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    /// Notes and news services
    pub application: Arc<QuillApplication>,
    /// Accounts backing the session cookie
    pub users: UserStore,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let application = QuillApplication::new(config.application_config())
            .await
            .map_err(|e| WebError::Config(format!("Failed to create application: {}", e)))?;

        let users = Self::user_store(&application).await?;

        info!("Application state initialized");
        Ok(Self {
            config,
            application: Arc::new(application),
            users,
        })
    }

    /// Memory-backed state with default settings
    pub fn in_memory() -> Self {
        let config = WebConfig::default();
        let application = QuillApplication::in_memory(config.home_page_count);
        Self {
            config,
            application: Arc::new(application),
            users: UserStore::memory(),
        }
    }

    /// Accounts live next to notes and news: same pool when on SQLite
    #[cfg(feature = "sqlite")]
    async fn user_store(application: &QuillApplication) -> WebResult<UserStore> {
        let Some(pool) = application.sqlite_pool() else {
            return Ok(UserStore::memory());
        };

        let store = DatabaseUserStore::new(pool.clone()).await?;
        Ok(UserStore::database(store))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn user_store(_application: &QuillApplication) -> WebResult<UserStore> {
        Ok(UserStore::memory())
    }
}
