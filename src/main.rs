//! API Cache diagnostics server
//!
//! Builds the cache instances, keeps expired entries swept, and exposes
//! their state over HTTP for inspection and manual invalidation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_cache::api::create_router;
use api_cache::cache::{open_storage, DefaultClassifier};
use api_cache::clock::SystemClock;
use api_cache::{spawn_cleanup_task, AppState, CacheRegistry, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the session storage medium and build the cache registry
/// 4. Start background expiry cleanup task
/// 5. Serve the diagnostics API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s, storage={:?}",
        config.server_port, config.cleanup_interval, config.storage_path
    );

    let storage = open_storage(config.storage_path.as_deref());

    let caches = CacheRegistry::with_overrides(
        storage,
        Arc::new(SystemClock),
        Arc::new(DefaultClassifier),
        |cache_config| config.tune(cache_config),
    );

    let cleanup_handle = spawn_cleanup_task(caches.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(AppState::new(caches));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving diagnostics API")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
