//! Quill Web Server
//!
//! Serves the notes site at `/` and the news site at `/news/`.

use anyhow::Context;
use clap::Parser;
use quill_core::QuillConfig;
use quill_web::server::QuillServerBuilder;
use quill_web::WebConfig;
use tracing::info;

/// Quill Web Server - private notes and a moderated news feed
#[derive(Parser, Debug)]
#[command(name = "quill-web")]
#[command(about = "HTTP server for the Quill notes and news sites")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite URL, e.g. sqlite://quill.db; in-memory when omitted
    #[arg(long)]
    database_url: Option<String>,

    /// Configuration file (TOML); falls back to QUILL_CONFIG
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Publish this many placeholder news items at startup
    #[arg(long, default_value_t = 0)]
    seed_news: usize,
}

fn load_config(args: &Args) -> anyhow::Result<QuillConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("QUILL_CONFIG").ok());

    let mut config = match path {
        Some(path) => QuillConfig::from_file(&path)
            .inspect_err(|e| e.log())
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => QuillConfig::default(),
    };

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config
        .validate()
        .inspect_err(|e| e.log())
        .context("Invalid configuration")?;
    Ok(config)
}

fn web_config(args: &Args, config: &QuillConfig) -> WebConfig {
    let mut web = WebConfig::from_quill_config(config).with_env_overrides();

    if let Some(host) = &args.host {
        web.host = host.clone();
    }
    if let Some(port) = args.port {
        web.port = port;
    }
    if let Some(url) = &args.database_url {
        web.database_url = Some(url.clone());
    }
    web
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(&args)?;
    quill_core::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let web = web_config(&args, &config);
    match &web.database_url {
        Some(url) => info!("Database: {}", url),
        None => info!("Database: in-memory"),
    }

    let server = QuillServerBuilder::from_config(web)
        .build()
        .await
        .context("Failed to build server")?;

    if args.seed_news > 0 {
        server.seed_news(args.seed_news).await?;
    }

    server.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["quill-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert_eq!(args.seed_news, 0);

        let args = Args::parse_from([
            "quill-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--database-url",
            "sqlite://quill.db",
            "--seed-news",
            "11",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.database_url.as_deref(), Some("sqlite://quill.db"));
        assert_eq!(args.seed_news, 11);
    }

    #[test]
    fn flags_override_the_config_file() {
        let args = Args::parse_from(["quill-web", "--port", "9000", "--log-level", "debug"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.logging.level, "debug");

        let web = web_config(&args, &config);
        assert_eq!(web.port, 9000);
        assert_eq!(web.home_page_count, 10);
    }
}
