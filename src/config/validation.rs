//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses parse and prefixes are well-formed
//! - Validate value ranges (timeouts > 0, body cap > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cache.version must not be empty")]
    EmptyVersion,

    #[error("listener.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),

    #[error("upstream.origin is not a valid authority: {0}")]
    InvalidOrigin(String),

    #[error("path prefix must start with '/': {0}")]
    BadPrefix(String),

    #[error("page route must start with '/': {0}")]
    BadPageRoute(String),

    #[error("precache entry must be a '/' path or an absolute http(s) URL: {0}")]
    BadManifestEntry(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("cache.max_body_bytes must be greater than zero")]
    ZeroBodyCap,
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    // Origin is an authority, not a full URL; parse it through a dummy scheme.
    if url::Url::parse(&format!("http://{}", config.upstream.origin)).is_err()
        || config.upstream.origin.contains('/')
    {
        errors.push(ValidationError::InvalidOrigin(config.upstream.origin.clone()));
    }

    for prefix in config
        .cache
        .realtime_prefixes
        .iter()
        .chain(config.cache.api_prefixes.iter())
    {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::BadPrefix(prefix.clone()));
        }
    }

    for route in &config.cache.page_routes {
        if !route.starts_with('/') {
            errors.push(ValidationError::BadPageRoute(route.clone()));
        }
    }

    for entry in &config.cache.precache {
        let absolute = entry.starts_with("http://") || entry.starts_with("https://");
        if !absolute && !entry.starts_with('/') {
            errors.push(ValidationError::BadManifestEntry(entry.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.cache.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyCap);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
