//! # hubwatch API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          hubwatch Server                                │
//! │                                                                         │
//! │  client / cron ───► HTTP (8080) ───► Services ───► subscriptions.json  │
//! │                                         │                               │
//! │                                         ▼                               │
//! │  WebSub hub ◄──── form POST ──── WebSubHubClient                        │
//! │  WebSub hub ────► GET /callback (challenge echo)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hubwatch_api::{router, AppState, ServiceConfig, WebSubHubClient};
use hubwatch_store::{JsonFileStore, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting hubwatch API server...");

    // Load configuration
    let config = ServiceConfig::load().context("Failed to load configuration")?;
    info!(
        bind = %config.server.bind_address(),
        hub = %config.hub.url,
        callback = %config.feed_urls().callback_url(),
        "Configuration loaded"
    );

    if config.storage.path.is_none() {
        warn!("storage.path is not set; every subscription request will fail until it is");
    }

    // Wire capabilities
    let clock = Arc::new(SystemClock);
    let store = Arc::new(JsonFileStore::new(config.storage.path.clone(), clock.clone()));
    let hub = Arc::new(
        WebSubHubClient::new(
            config.hub.url.clone(),
            config.feed_urls(),
            config.hub.lease_seconds,
            config.hub_timeout(),
        )
        .context("Failed to build hub client")?,
    );

    let state = Arc::new(AppState::new(&config, store, hub, clock));
    let app = router(state);

    // Bind the listener
    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(addr = %bind_addr, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
