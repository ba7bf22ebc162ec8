//! Synthetic responses.
//!
//! # Responsibilities
//! - Build the error responses the router surfaces when the network and the
//!   cache have both failed a request
//!
//! # Design Decisions
//! - 502 for an upstream failure with nothing cached
//! - 503 for a network-first request that is offline with no snapshot
//! - Plain text bodies; these are machine-visible failures, not pages

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

fn synthetic(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// The upstream fetch failed and no cached entry satisfies the request.
pub fn bad_gateway() -> Response<Body> {
    synthetic(StatusCode::BAD_GATEWAY, "upstream fetch failed")
}

/// Network-first request failed and no snapshot exists for its key.
pub fn offline() -> Response<Body> {
    synthetic(StatusCode::SERVICE_UNAVAILABLE, "offline and no cached snapshot")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_statuses() {
        assert_eq!(bad_gateway().status(), StatusCode::BAD_GATEWAY);
        assert_eq!(offline().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
