//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → routing::CacheRouter (classify + execute strategy)
//!     → response.rs (synthetic errors when network and cache both fail)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::HttpServer;
