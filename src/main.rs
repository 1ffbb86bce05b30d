//! Alias Cache - HTTP front end for the namespaced cache and check-in tracker
//!
//! Serves the cache proxy and check-in endpoints over either Redis or the
//! in-memory store, selected by `STORE_BACKEND`.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alias_cache::{
    api::create_router, spawn_cleanup_task, AppState, Config, KeyValueStore, MemoryStore,
    RedisStore, StoreBackend,
};

/// Main entry point for the Alias Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to Redis, or create the memory store and its cleanup task
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alias_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Alias Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, default_ttl={}s, prefix={}, port={}",
        config.backend, config.default_ttl, config.check_in_prefix, config.server_port
    );

    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(config.connection_info())
                .await
                .with_context(|| {
                    format!(
                        "failed to connect to Redis at {}:{}",
                        config.redis_host, config.redis_port
                    )
                })?;
            serve(store, &config, None).await
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            info!("Background cleanup task started");
            serve(store, &config, Some(cleanup_handle)).await
        }
    }
}

/// Builds the router over `store` and serves it until a shutdown signal.
async fn serve<S: KeyValueStore>(
    store: S,
    config: &Config,
    cleanup_handle: Option<JoinHandle<()>>,
) -> anyhow::Result<()> {
    let state = AppState::from_config(store, config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
