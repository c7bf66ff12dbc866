//! Static file server
//!
//! Serves a document root through the mounts listed in its configuration
//! file, given as the only argument (default `staticrouter.toml`).

use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staticrouter::config::ServerConfig;
use staticrouter::Result;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "staticrouter";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "staticrouter.toml".to_string());
    let config = if Path::new(&config_path).exists() {
        Some(ServerConfig::from_file(&config_path))
    } else {
        None
    };

    let level = match &config {
        Some(Ok(config)) => config.log_level.clone(),
        _ => "info".to_string(),
    };
    init_logging(&level);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    let config = match config {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::warn!(
                "Failed to load config file {}: {}. Using defaults.",
                config_path,
                e
            );
            ServerConfig::default()
        }
        None => ServerConfig::default(),
    };
    tracing::info!("Configuration loaded: {:?}", config);

    // a malformed mount template stops startup here
    let router = config.router()?;
    for template in router.templates() {
        tracing::info!(template, "route");
    }

    let addr = config.socket_addr()?;
    tracing::info!("Serving {} on http://{}/", config.document_root.display(), addr);

    hyper::Server::try_bind(&addr)?
        .serve(router.into_service())
        .await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("staticrouter={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
