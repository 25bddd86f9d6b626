//! Chain Cache - admin server
//!
//! Connects the store once at startup, serves the cache admin API and
//! closes the store on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chain_cache::api::{create_router, AppState};
use chain_cache::config::{BackendConfig, Config};
use chain_cache::store::{self, KeyValueStore, MemoryStore};
use chain_cache::{spawn_cleanup_task, CacheService};

/// Main entry point for the cache admin server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load `.env` and configuration from environment variables
/// 3. Connect the store (Redis direct/sentinel, or in-process)
/// 4. Build the cache service and the Axum router
/// 5. Serve until SIGINT/SIGTERM, then close the store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chain_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chain Cache v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded, relying on process environment: {}", e);
    }

    let config = Config::from_env().context("invalid configuration")?;
    info!(port = config.server_port, "configuration loaded");

    let (store, cleanup_handle): (Arc<dyn KeyValueStore>, Option<JoinHandle<()>>) =
        match &config.backend {
            BackendConfig::Redis(store_config) => {
                let redis: Arc<dyn KeyValueStore> = Arc::new(
                    store::connect(store_config)
                        .await
                        .context("failed to connect to redis")?,
                );
                (redis, None)
            }
            BackendConfig::Memory { cleanup_interval } => {
                let memory = Arc::new(MemoryStore::new());
                let handle = spawn_cleanup_task(memory.clone(), *cleanup_interval);
                info!("Using in-process store");
                let memory: Arc<dyn KeyValueStore> = memory;
                (memory, Some(handle))
            }
        };

    let cache = CacheService::new(store.clone(), config.default_ttl);
    info!(
        default_ttl_secs = cache.default_ttl().as_secs(),
        "cache service ready"
    );
    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
    store.close().await;

    served.context("server error")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
}
