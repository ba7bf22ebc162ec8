//! Ordered startup sequence.
//!
//! # Responsibilities
//! - Build the store, upstream client and cache router from config
//! - Run install (precache) and activate (stale eviction) before serving
//! - Bind the listener and hand control to the HTTP server
//!
//! # Design Decisions
//! - Install failure is fatal to the deploy: the process exits nonzero and
//!   whatever was serving traffic before stays in control
//! - Activation runs before the listener binds, so the new version starts
//!   serving all clients immediately with only its own namespace present

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::routing::{CacheRouter, InstallError};
use crate::upstream::UpstreamClient;

/// Error type for the startup sequence.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid upstream origin: {0}")]
    Origin(#[from] axum::http::uri::InvalidUri),

    #[error("install failed: {0}")]
    Install(#[from] InstallError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the gateway to completion: install, activate, serve.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => crate::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = crate::cache::CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream)?);
    let router = Arc::new(CacheRouter::new(&config.cache, store, client));

    // New version takes over immediately once its manifest is fully
    // populated; a failed install leaves nothing behind.
    router.install().await?;
    router.activate();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        version = router.version(),
        "Gateway ready"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(&config, router);
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
