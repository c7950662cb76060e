//! Favorites Service
//!
//! Serves `/favorites` on top of Redis until the listener fails or the
//! process is asked to stop.

use std::sync::Arc;

use anyhow::Context;
use favorites_service::{
    build_router, config::Config, logging::init_logging, state::AppState, store::RedisStore,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env();

    // Initialize tracing
    init_logging(config.log_format);
    info!("App startup");
    info!("Configuration loaded: {:?}", config);

    let store = RedisStore::new(&config.store).context("Invalid Redis address")?;
    match store.connect().await {
        Ok(()) => info!("Redis reachable at {}", config.store.url()),
        Err(e) => warn!(
            error = %e,
            "Redis not reachable at {}, retrying on first request",
            config.store.url()
        ),
    }

    let address = config.server_addr();
    let app = build_router(AppState::new(Arc::new(store), config));

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "Failed to bind {}", address);
            return Err(e).with_context(|| format!("Failed to bind {address}"));
        }
    };

    info!("Server running on http://{}", address);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Setup graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server stopped unexpectedly");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
