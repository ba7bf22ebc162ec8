//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests by strategy/outcome, latency, cache size)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by strategy, status, outcome
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_cache_entries` (gauge): entries per namespace
//! - `gateway_cache_evictions_total` (counter): namespaces destroyed
//! - `gateway_install_total` (counter): install attempts by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for strategy, outcome (hit/miss/fallback/error) and status code
//! - Recording is infallible; a missing exporter just drops the samples

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(strategy: &str, status: u16, outcome: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "strategy" => strategy.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "strategy" => strategy.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the current entry count of a namespace.
pub fn record_cache_entries(version: &str, entries: usize) {
    gauge!("gateway_cache_entries", "namespace" => version.to_string()).set(entries as f64);
}

/// Record the destruction of a stale namespace.
pub fn record_eviction(version: &str) {
    counter!("gateway_cache_evictions_total", "namespace" => version.to_string()).increment(1);
}

/// Record an install attempt.
pub fn record_install(success: bool) {
    let result = if success { "ok" } else { "failed" };
    counter!("gateway_install_total", "result" => result).increment(1);
}
