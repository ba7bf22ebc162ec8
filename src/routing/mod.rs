//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path, accept, redirect mode)
//!     → classifier.rs (pure classification, first match wins)
//!     → router.rs (execute strategy: bypass / network-only /
//!                  network-first / cache-first)
//!     → exactly one response per request
//!
//! Table compilation (at startup):
//!     CacheConfig prefix sets
//!     → RoutingTable (immutable)
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - Deterministic: same request attributes always classify the same way
//! - The router owns the namespace lifecycle (install/activate) because the
//!   strategies and the lifecycle share one version tag

pub mod classifier;
pub mod router;

pub use classifier::{RedirectMode, RoutingTable, Strategy, X_REDIRECT_MODE};
pub use router::{CacheRouter, GatewayStatus, InstallError, NamespaceStatus};
