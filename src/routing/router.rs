//! The cache router: strategy execution and namespace lifecycle.
//!
//! # Responsibilities
//! - Resolve every intercepted request to exactly one response
//! - Execute the four strategies against the store and the upstream
//! - Populate the namespace at install, evict stale namespaces at activate
//!
//! # Design Decisions
//! - The version tag is injected at construction; no process-wide state, so
//!   tests can run several versions side by side
//! - Each request is handled independently; one request's fallback chain
//!   never blocks another
//! - Install is all-or-nothing: any manifest failure removes the
//!   partially populated namespace, leaving the previous deploy in control

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode, Uri};
use serde::Serialize;

use crate::cache::{CacheKey, CacheStore, CachedResponse, SnapshotError};
use crate::config::CacheConfig;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::classifier::{RoutingTable, Strategy};
use crate::upstream::{Fetch, FetchError};

/// Error aborting an install attempt.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("manifest entry is not a valid URL: {url}")]
    BadUrl { url: String },

    #[error("manifest fetch failed for {url}: {source}")]
    ManifestFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("manifest entry {url} could not be buffered: {source}")]
    Snapshot {
        url: String,
        #[source]
        source: SnapshotError,
    },

    #[error("manifest entry {url} returned status {status}")]
    BadStatus { url: String, status: StatusCode },
}

/// Snapshot of the router's namespaces, served by the status endpoint.
#[derive(Debug, Serialize)]
pub struct GatewayStatus {
    pub version: String,
    pub namespaces: Vec<NamespaceStatus>,
}

#[derive(Debug, Serialize)]
pub struct NamespaceStatus {
    pub tag: String,
    pub entries: usize,
}

/// Request-interception policy over a versioned cache namespace.
pub struct CacheRouter {
    store: CacheStore,
    fetcher: Arc<dyn Fetch>,
    table: RoutingTable,
    version: String,
    manifest: Vec<String>,
    max_body_bytes: usize,
}

impl CacheRouter {
    pub fn new(config: &CacheConfig, store: CacheStore, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            store,
            fetcher,
            table: RoutingTable::from_config(config),
            version: config.version.clone(),
            manifest: config.precache.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Populate the namespace for the current version from the precache
    /// manifest. All-or-nothing: on any failure the namespace is removed and
    /// the error propagates, so a broken deploy never becomes active.
    pub async fn install(&self) -> Result<(), InstallError> {
        self.store.open(&self.version);
        tracing::info!(namespace = %self.version, entries = self.manifest.len(), "Installing precache manifest");

        let result = self.populate().await;
        match &result {
            Ok(()) => {
                tracing::info!(
                    namespace = %self.version,
                    entries = self.store.len(&self.version),
                    "Install complete"
                );
                metrics::record_install(true);
            }
            Err(e) => {
                tracing::error!(namespace = %self.version, error = %e, "Install failed, removing namespace");
                self.store.remove(&self.version);
                metrics::record_install(false);
            }
        }
        result
    }

    async fn populate(&self) -> Result<(), InstallError> {
        for entry in &self.manifest {
            let uri: Uri = entry.parse().map_err(|_| InstallError::BadUrl {
                url: entry.clone(),
            })?;
            let cross_origin = !self.fetcher.is_same_origin(&uri);

            let request = Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .map_err(|_| InstallError::BadUrl { url: entry.clone() })?;

            let upstream = self
                .fetcher
                .fetch(request)
                .await
                .map_err(|source| InstallError::ManifestFetch {
                    url: entry.clone(),
                    source,
                })?;

            let snapshot = CachedResponse::materialize(upstream, cross_origin, self.max_body_bytes)
                .await
                .map_err(|source| InstallError::Snapshot {
                    url: entry.clone(),
                    source,
                })?;

            // Manifest entries are a trusted fixed list; third-party CDN
            // assets are allowed in, but any non-success status aborts.
            if !snapshot.status().is_success() {
                return Err(InstallError::BadStatus {
                    url: entry.clone(),
                    status: snapshot.status(),
                });
            }

            self.store
                .put(&self.version, CacheKey::from_manifest_entry(entry), snapshot);
        }
        Ok(())
    }

    /// Promote the current namespace: destroy every other one. Returns the
    /// evicted tags.
    pub fn activate(&self) -> Vec<String> {
        let evicted = self.store.evict_stale(&self.version);
        tracing::info!(
            namespace = %self.version,
            evicted = evicted.len(),
            "Cache namespace activated"
        );
        evicted
    }

    /// Resolve one intercepted request. Exactly one response per call.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let strategy = self.table.classify_request(&request);
        tracing::debug!(
            strategy = strategy.as_str(),
            method = %request.method(),
            path = %request.uri().path(),
            "Classified request"
        );

        let (response, outcome) = match strategy {
            Strategy::Bypass | Strategy::NetworkOnly => self.forward(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        };

        metrics::record_request(
            strategy.as_str(),
            response.status().as_u16(),
            outcome,
            start,
        );
        response
    }

    /// Bypass and network-only: straight to the upstream, cache untouched.
    async fn forward(&self, request: Request<Body>) -> (Response<Body>, &'static str) {
        match self.fetcher.fetch(request).await {
            Ok(upstream) => (upstream, "forwarded"),
            Err(e) => {
                tracing::error!(error = %e, "Upstream fetch failed");
                (response::bad_gateway(), "error")
            }
        }
    }

    /// Network-first: live response preferred and never cached, so pages
    /// stay fresh. On network failure, fall back to the snapshot stored for
    /// this exact key at install time.
    async fn network_first(&self, request: Request<Body>) -> (Response<Body>, &'static str) {
        let key = request_key(&request);
        match self.fetcher.fetch(request).await {
            Ok(upstream) => (upstream, "live"),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Network failed, falling back to cache");
                match self.store.get(&self.version, &key) {
                    Some(snapshot) => (snapshot.to_response(), "fallback"),
                    None => (response::offline(), "error"),
                }
            }
        }
    }

    /// Cache-first: serve the stored snapshot without touching the network;
    /// on a miss, fetch and store a qualifying copy before serving it.
    async fn cache_first(&self, request: Request<Body>) -> (Response<Body>, &'static str) {
        let key = request_key(&request);
        if let Some(snapshot) = self.store.get(&self.version, &key) {
            return (snapshot.to_response(), "hit");
        }

        let cross_origin = !self.fetcher.is_same_origin(request.uri());
        let upstream = match self.fetcher.fetch(request).await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Asset fetch failed with no cached entry");
                return (response::bad_gateway(), "error");
            }
        };

        // A body declared larger than the buffering cap is still a valid
        // response; stream it through untouched instead of buffering, and
        // never store it.
        if declares_oversize_body(&upstream, self.max_body_bytes) {
            tracing::debug!(key = %key, limit = self.max_body_bytes, "Asset exceeds body cap, serving uncached");
            return (upstream, "uncacheable");
        }

        match CachedResponse::materialize(upstream, cross_origin, self.max_body_bytes).await {
            Ok(snapshot) => {
                if snapshot.is_cacheable() {
                    // The snapshot owns its bytes, so store and caller each
                    // hold an independent copy of the response.
                    self.store.put(&self.version, key, snapshot.clone());
                    (snapshot.to_response(), "populated")
                } else {
                    (snapshot.to_response(), "uncacheable")
                }
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to buffer asset response");
                (response::bad_gateway(), "error")
            }
        }
    }

    /// Current namespace layout for the status endpoint.
    pub fn status(&self) -> GatewayStatus {
        let mut namespaces: Vec<NamespaceStatus> = self
            .store
            .namespaces()
            .into_iter()
            .map(|tag| {
                let entries = self.store.len(&tag);
                NamespaceStatus { tag, entries }
            })
            .collect();
        namespaces.sort_by(|a, b| a.tag.cmp(&b.tag));

        GatewayStatus {
            version: self.version.clone(),
            namespaces,
        }
    }
}

/// Cache key for an intercepted request: its path plus query string.
fn request_key(request: &Request<Body>) -> CacheKey {
    let key = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    CacheKey::from_path_and_query(key)
}

/// True when the response declares a Content-Length above the buffering cap.
/// Undeclared lengths fall through to the capped buffering path.
fn declares_oversize_body(response: &Response<Body>, limit: usize) -> bool {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .is_some_and(|length| length > limit as u64)
}
