//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the caching gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Upstream origin the gateway fronts.
    pub upstream: UpstreamConfig,

    /// Cache version, precache manifest and routing table.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin authority relative requests are rewritten to (e.g., "127.0.0.1:3000").
    pub origin: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Cache namespace and request-classification configuration.
///
/// The prefix sets form an explicit routing table. They must cover the exact
/// path sets the fronted application treats as realtime/API traffic; adding a
/// dynamic path here is the only way to keep it out of the asset cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache namespace tag for this deployment. Bumped on every release;
    /// namespaces with any other tag are evicted at activation.
    pub version: String,

    /// URLs fetched and stored at install time. Paths are resolved against
    /// the upstream origin; absolute URLs (CDN assets) are fetched as-is.
    pub precache: Vec<String>,

    /// Path prefixes carrying realtime/streaming traffic. Never intercepted.
    pub realtime_prefixes: Vec<String>,

    /// Path prefixes serving dynamic data. Always fetched fresh, never cached.
    pub api_prefixes: Vec<String>,

    /// Exact paths treated as page navigations (network-first), in addition
    /// to requests with an HTML accept header.
    pub page_routes: Vec<String>,

    /// Upper bound on a single cached response body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "assets-v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/login".to_string(),
                "/chat".to_string(),
                "/css/chat-style.css".to_string(),
                "/css/kawaii-theme.css".to_string(),
                "/css/mobile.css".to_string(),
                "/js/kawaii-theme.js".to_string(),
                "/js/pwa.js".to_string(),
                "/images/default-avatar.svg".to_string(),
                "/images/app-icon.svg".to_string(),
                "/images/app-icon-48.svg".to_string(),
                "/images/app-icon-72.svg".to_string(),
                "/images/app-icon-96.svg".to_string(),
                "/images/app-icon-144.svg".to_string(),
                "/images/app-icon-180.svg".to_string(),
                "/images/app-icon-180.png".to_string(),
                "/images/app-icon-192.svg".to_string(),
                "/images/app-icon-192-enhanced.svg".to_string(),
                "/manifest.json".to_string(),
                "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css".to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css".to_string(),
                "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/js/bootstrap.bundle.min.js".to_string(),
            ],
            realtime_prefixes: vec!["/ws".to_string()],
            api_prefixes: vec!["/api/".to_string()],
            page_routes: vec![
                "/".to_string(),
                "/login".to_string(),
                "/chat".to_string(),
            ],
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// End-to-end request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Bind address for the metrics endpoint.
    pub metrics_address: String,

    /// Default log filter when RUST_LOG is not set.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            log_filter: "cachegate=debug,tower_http=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_app_paths() {
        let config = CacheConfig::default();
        assert!(config.precache.contains(&"/manifest.json".to_string()));
        assert!(config.realtime_prefixes.contains(&"/ws".to_string()));
        assert!(config.api_prefixes.contains(&"/api/".to_string()));
        assert_eq!(config.page_routes.len(), 3);
    }

    #[test]
    fn minimal_toml_deserializes_with_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [cache]
            version = "assets-v2"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.version, "assets-v2");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.cache.precache.is_empty());
    }
}
