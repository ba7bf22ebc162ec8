//! Cache keys and materialized response snapshots.
//!
//! # Responsibilities
//! - Key cache entries by GET URL (path + query)
//! - Buffer an upstream response into an immutable snapshot
//! - Decide whether a snapshot qualifies for storage
//!
//! # Design Decisions
//! - Only GET requests are ever keyed; the store never sees other methods
//! - A snapshot owns its body bytes, so the cache and the caller each get
//!   an independent copy of the response
//! - Storage guard is strict: status 200, no redirect, same-origin only

use axum::body::Body;
use axum::http::{header, HeaderMap, Response, StatusCode};
use bytes::Bytes;

/// Key identifying one cached response: request path plus query string.
///
/// Absolute manifest URLs (CDN assets) keep their full URL as the key so
/// they cannot collide with first-party paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a first-party request, from its path and query.
    pub fn from_path_and_query(path_and_query: &str) -> Self {
        Self(path_and_query.to_string())
    }

    /// Key for a manifest entry, which may be a path or an absolute URL.
    pub fn from_manifest_entry(entry: &str) -> Self {
        Self(entry.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error buffering a response body into a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("response body exceeded {limit} bytes or could not be read: {source}")]
    Body {
        limit: usize,
        source: axum::Error,
    },
}

/// A fully materialized response: status, headers and body bytes.
///
/// Entries are immutable once stored; an entry is only ever replaced by a
/// fresh fetch-and-store of the same key.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    /// True when the response came from a third-party origin. Opaque
    /// responses are served but never stored.
    cross_origin: bool,
}

impl CachedResponse {
    /// Buffer a response into a snapshot, consuming its body stream.
    ///
    /// `cross_origin` marks responses fetched from an authority other than
    /// the configured upstream.
    pub async fn materialize(
        response: Response<Body>,
        cross_origin: bool,
        limit: usize,
    ) -> Result<Self, SnapshotError> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|source| SnapshotError::Body { limit, source })?;

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
            cross_origin,
        })
    }

    /// Whether this snapshot qualifies for cache storage.
    ///
    /// Mirrors the storage guard of the fronted application: exactly status
    /// 200, not a redirect (neither a 3xx status nor a Location header), and
    /// not cross-origin. Anything else is returned to the caller but never
    /// written, so the cache cannot be poisoned with partial or
    /// non-reusable responses.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
            && !self.headers.contains_key(header::LOCATION)
            && !self.cross_origin
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Rebuild a servable response from this snapshot.
    ///
    /// `Bytes` is reference-counted, so this does not copy the body; the
    /// stored entry stays untouched.
    pub fn to_response(&self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: StatusCode, location: Option<&str>, cross_origin: bool) -> CachedResponse {
        let mut headers = HeaderMap::new();
        if let Some(loc) = location {
            headers.insert(header::LOCATION, loc.parse().unwrap());
        }
        CachedResponse {
            status,
            headers,
            body: Bytes::from_static(b"body"),
            cross_origin,
        }
    }

    #[test]
    fn ok_basic_response_is_cacheable() {
        assert!(snapshot(StatusCode::OK, None, false).is_cacheable());
    }

    #[test]
    fn non_200_is_not_cacheable() {
        assert!(!snapshot(StatusCode::NOT_FOUND, None, false).is_cacheable());
        assert!(!snapshot(StatusCode::INTERNAL_SERVER_ERROR, None, false).is_cacheable());
        assert!(!snapshot(StatusCode::MOVED_PERMANENTLY, Some("/login"), false).is_cacheable());
    }

    #[test]
    fn location_header_marks_redirect() {
        // A 200 carrying Location means some hop rewrote a redirect; refuse it.
        assert!(!snapshot(StatusCode::OK, Some("/elsewhere"), false).is_cacheable());
    }

    #[test]
    fn cross_origin_is_not_cacheable() {
        assert!(!snapshot(StatusCode::OK, None, true).is_cacheable());
    }

    #[tokio::test]
    async fn materialize_then_serve_round_trip() {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/css")
            .body(Body::from("body { color: pink }"))
            .unwrap();

        let snapshot = CachedResponse::materialize(response, false, 1024).await.unwrap();
        assert!(snapshot.is_cacheable());

        let served = snapshot.to_response();
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(
            served.headers().get("content-type").unwrap(),
            "text/css"
        );
    }

    #[tokio::test]
    async fn materialize_enforces_body_cap() {
        let response = Response::new(Body::from(vec![0u8; 64]));
        let err = CachedResponse::materialize(response, false, 16).await;
        assert!(err.is_err());
    }
}
