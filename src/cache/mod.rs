//! Cache subsystem.
//!
//! # Data Flow
//! ```text
//! Install:
//!     manifest URLs → fetch → materialize → put into new namespace
//!
//! Steady state (cache-first assets):
//!     request key → get → hit: serve snapshot
//!                        → miss: fetch → qualifies? → put + serve
//!
//! Activate:
//!     evict_stale(current) → only the current namespace survives
//! ```
//!
//! # Design Decisions
//! - Exactly one namespace is current at any time; the tag is injected at
//!   construction rather than read from a global
//! - Entries are immutable snapshots; replacement is re-fetch-and-store
//! - The storage guard lives on the snapshot, not the store, so every write
//!   path shares it

pub mod entry;
pub mod store;

pub use entry::{CacheKey, CachedResponse, SnapshotError};
pub use store::{CacheStore, Namespace};
