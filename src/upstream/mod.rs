//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! Router strategy decides to hit the network
//!     → client.rs (URI rewrite to origin, pooled hyper client)
//!     → origin response streamed back, or FetchError
//! ```
//!
//! # Design Decisions
//! - One `Fetch` trait as the seam; the router never names a concrete client
//! - Fetch errors are values, not panics; every strategy decides its own
//!   fallback

pub mod client;

pub use client::{Fetch, FetchError, UpstreamClient};
