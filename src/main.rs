//! Cache API - A key-value cache server with per-entry TTL
//!
//! Serves `GET /:key` and `POST /:key` from an in-memory TTL store or Redis.

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cache_api::{
    cache::RedisCache, create_router, logging::init_tracing, AppState, Config, StoreConfig,
    TtlStore,
};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Load `.env` (if present) and configuration from the environment
/// 2. Initialize tracing
/// 3. Create the selected cache backend (the in-memory store starts its sweep)
/// 4. Serve HTTP until SIGINT/SIGTERM
/// 5. Stop the sweep and wait for it to exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv()?;
    let config = Config::from_env().context("error loading config")?;

    init_tracing(config.debug, config.log_color);
    info!(
        "Configuration loaded: ttl={}s, eviction_interval={}ms, use_redis={}, addr={}",
        config.cache.ttl_seconds,
        config.cache.eviction_interval_ms,
        config.use_redis,
        config.socket_addr()
    );

    let shutdown = CancellationToken::new();

    let (state, memory_store) = if config.use_redis {
        info!("Using redis as the cache");
        let cache = RedisCache::connect(&config.cache, &config.redis)
            .await
            .context("error creating redis cache")?;
        (AppState::from_cache(cache), None)
    } else {
        info!("Using in-memory cache");
        let store: TtlStore<String> =
            TtlStore::new(StoreConfig::from(&config.cache), &shutdown);
        (AppState::from_cache(store.clone()), Some(store))
    };

    let app = create_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("error binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("error serving http")?;

    shutdown.cancel();
    if let Some(store) = memory_store {
        store.shutdown().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Loads `.env` into the environment; a missing file is fine.
fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("error loading .env"),
    }
}

/// Waits for Ctrl+C, SIGTERM or cancellation of `shutdown`, then cancels it.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
