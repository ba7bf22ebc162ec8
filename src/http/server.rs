//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all interception handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Serve the status endpoint under the reserved internal prefix
//! - Dispatch every other request to the cache router
//!
//! # Design Decisions
//! - The catch-all handler is the interception point: every request under
//!   the gateway's scope raises exactly one `CacheRouter::handle` call
//! - `/internal/status` is resolved before classification; it belongs to
//!   the gateway, not the fronted application
//! - `listener.max_connections` caps in-flight requests with a shared
//!   semaphore; excess requests queue until a permit frees up
//! - Graceful shutdown via the lifecycle broadcast channel

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    response::Json,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::routing::{CacheRouter, GatewayStatus};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CacheRouter>,
}

/// HTTP server for the caching gateway.
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    /// Create a new HTTP server around an installed cache router.
    pub fn new(config: &GatewayConfig, cache_router: Arc<CacheRouter>) -> Self {
        let state = AppState {
            router: cache_router,
        };
        let app = Self::build_router(config, state);
        Self { app }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/internal/status", get(status_handler))
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Interception handler: one request in, one fulfillment outcome out.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    state.router.handle(request).await
}

/// Report the current version tag and namespace layout.
async fn status_handler(State(state): State<AppState>) -> Json<GatewayStatus> {
    Json(state.router.status())
}
