//! Image Conversion Service
//!
//! Uploads are resized, recolored and re-encoded, with output dimensions
//! optionally suggested by a vision model. Serves a REST API (Axum) and a
//! single-page form.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use imgtune::advisor::{AnthropicAdvisor, ContentAdvisor};
use imgtune::api::{create_rest_router, AppState, RouterOptions};
use imgtune::config::{Config, StorageConfig};
use imgtune::service::ConversionService;
use imgtune::storage::{ImageStore, NullStorage, SqliteStorage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Image Conversion Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| Config::default_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  Listen: {}:{}", config.server.host, config.server.port);
    info!("  Advisor model: {}", config.advisor.model);
    info!("  Database: {:?}", config.storage.sqlite_path);

    // Advisory client, constructed once and shared
    let advisor: Option<Arc<dyn ContentAdvisor>> = match config.advisor.api_key() {
        Some(key) => Some(Arc::new(AnthropicAdvisor::new(&config.advisor, key)?)),
        None => {
            warn!(
                "{} is not set; /api/process-image will answer 500 until it is configured",
                config.advisor.api_key_env
            );
            None
        }
    };

    let storage = open_storage(&config.storage).await?;
    info!("History storage: {}", storage.backend_name());

    let service = Arc::new(ConversionService::new(
        advisor,
        storage,
        config.storage.history_limit,
    ));

    let app_state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let static_dir = config.server.static_dir.exists().then_some(config.server.static_dir.as_path());
    if static_dir.is_none() {
        warn!("Static directory {:?} not found, form page disabled", config.server.static_dir);
    }

    let rest_router = create_rest_router(
        app_state,
        RouterOptions {
            static_dir,
            max_upload_bytes: config.server.max_upload_mb * 1024 * 1024,
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("REST API listening on http://{}", addr);

    axum::serve(listener, rest_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Goodbye!");
    Ok(())
}

/// Open SQLite, or fall back to the no-op store unless the database is required
async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn ImageStore>> {
    let Some(path) = config.sqlite_path.as_ref() else {
        info!("No database configured, history disabled");
        return Ok(Arc::new(NullStorage));
    };

    let path = path.to_str().context("Database path is not valid UTF-8")?;
    match SqliteStorage::new(path).await {
        Ok(storage) => {
            info!("SQLite storage initialized at: {}", path);
            Ok(Arc::new(storage))
        }
        Err(e) if !config.required => {
            warn!("Database unavailable, history disabled: {:#}", e);
            Ok(Arc::new(NullStorage))
        }
        Err(e) => Err(e.context("Database is required but could not be opened")),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, cleaning up...");
}
