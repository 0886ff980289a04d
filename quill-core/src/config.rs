//! Configuration management

use crate::error::{ErrorContext, QuillError, QuillResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, usually loaded from `quill.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub news: NewsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite URL; `None` keeps everything in memory
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Number of news items shown on the home page
    pub home_page_count: usize,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            news: NewsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { database_url: None }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            home_page_count: 10,
        }
    }
}

impl QuillConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> QuillResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuillError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: QuillConfig = toml::from_str(&content).map_err(|e| QuillError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> QuillResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| QuillError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| QuillError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> QuillResult<()> {
        if self.news.home_page_count == 0 {
            return Err(QuillError::Config {
                message: "news.home_page_count must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set news.home_page_count to a positive value"),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(crate::config_error!("server.host must not be empty", "config"));
        }

        if let Some(url) = &self.storage.database_url {
            if !url.starts_with("sqlite:") {
                return Err(QuillError::Config {
                    message: format!("Unsupported database URL: {}", url),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Use a URL such as sqlite:quill.db or sqlite::memory:"),
                });
            }
        }

        Ok(())
    }
}
