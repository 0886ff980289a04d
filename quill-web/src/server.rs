//! Quill Web Server
//!
//! Binds the router to a TCP listener and serves until ctrl-c.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use chrono::{Duration, Utc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub struct QuillServer {
    config: WebConfig,
    state: AppState,
}

impl QuillServer {
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Publish `count` placeholder news items, one per day going back from today
    pub async fn seed_news(&self, count: usize) -> WebResult<()> {
        let today = Utc::now().date_naive();
        for offset in 0..count {
            let date = today - Duration::days(offset as i64);
            self.state
                .application
                .news
                .publish(&format!("Новость {}", offset + 1), "Просто текст.", date)
                .await?;
        }

        info!("Seeded {} news items", count);
        Ok(())
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Quill web server");
        info!("Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server stopped");
        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Builder for QuillServer
pub struct QuillServerBuilder {
    config: WebConfig,
}

impl QuillServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    pub fn home_page_count(mut self, count: usize) -> Self {
        self.config.home_page_count = count;
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<QuillServer> {
        QuillServer::new(self.config).await
    }
}

impl Default for QuillServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
