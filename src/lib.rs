//! Offline-capable caching gateway library.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use cache::CacheStore;
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::CacheRouter;
