//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with request IDs flowing through tower layers
//! - Metrics are cheap (atomic increments)
//! - Every routing decision is observable: strategy and outcome are labels

pub mod logging;
pub mod metrics;
