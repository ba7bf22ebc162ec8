//! Request classification.
//!
//! # Responsibilities
//! - Map every incoming request to exactly one fulfillment strategy
//! - Compile the configured prefix/route sets into an immutable table
//!
//! # Design Decisions
//! - Classification is a pure function of request attributes; no mutable
//!   state influences it
//! - Strict rule order, first match wins
//! - Explicit prefix sets instead of substring probes, so the set of paths
//!   treated as API-like is visible in config and exhaustively testable
//! - No regex in the hot path (prefix and exact matching only)

use axum::http::{Method, Request};

use crate::config::CacheConfig;

/// Header a client sets to opt out of interception for requests whose
/// redirects it handles itself.
pub const X_REDIRECT_MODE: &str = "x-redirect-mode";

/// Fulfillment strategy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Forward untouched; the cache is neither read nor written.
    Bypass,
    /// Always fetch fresh; never read or write the cache.
    NetworkOnly,
    /// Prefer the network; fall back to a cached snapshot on failure.
    NetworkFirst,
    /// Prefer the cache; on a miss, fetch and opportunistically store.
    CacheFirst,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Bypass => "bypass",
            Strategy::NetworkOnly => "network-only",
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheFirst => "cache-first",
        }
    }
}

/// How the requester wants redirects handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Follow,
    Manual,
}

impl RedirectMode {
    /// Derive the mode from the request's `x-redirect-mode` header.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let manual = request
            .headers()
            .get(X_REDIRECT_MODE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("manual"))
            .unwrap_or(false);
        if manual {
            RedirectMode::Manual
        } else {
            RedirectMode::Follow
        }
    }
}

/// Immutable routing table compiled from config at startup.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    realtime_prefixes: Vec<String>,
    api_prefixes: Vec<String>,
    page_routes: Vec<String>,
}

impl RoutingTable {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            realtime_prefixes: config.realtime_prefixes.clone(),
            api_prefixes: config.api_prefixes.clone(),
            page_routes: config.page_routes.clone(),
        }
    }

    /// Classify one request. Evaluated in strict order, first match wins:
    /// manual redirect, realtime prefix and non-GET all bypass; API prefixes
    /// go network-only; HTML accepts and known page routes go network-first;
    /// everything else is a static asset and goes cache-first.
    pub fn classify(
        &self,
        method: &Method,
        path: &str,
        accept: Option<&str>,
        redirect: RedirectMode,
    ) -> Strategy {
        if redirect == RedirectMode::Manual {
            return Strategy::Bypass;
        }

        if self.realtime_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return Strategy::Bypass;
        }

        if *method != Method::GET {
            return Strategy::Bypass;
        }

        if self.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return Strategy::NetworkOnly;
        }

        let wants_html = accept.map(|a| a.contains("text/html")).unwrap_or(false);
        if wants_html || self.page_routes.iter().any(|r| r == path) {
            return Strategy::NetworkFirst;
        }

        Strategy::CacheFirst
    }

    /// Convenience wrapper extracting the classification attributes from a
    /// request.
    pub fn classify_request<B>(&self, request: &Request<B>) -> Strategy {
        let accept = request
            .headers()
            .get(axum::http::header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        self.classify(
            request.method(),
            request.uri().path(),
            accept,
            RedirectMode::from_request(request),
        )
    }
}
