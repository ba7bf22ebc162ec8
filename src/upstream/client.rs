//! Origin fetch client.
//!
//! # Responsibilities
//! - Rewrite relative request URIs to the configured origin authority
//! - Forward requests over plain HTTP via the pooled hyper client
//! - Fetch absolute https URLs (third-party manifest assets) via reqwest
//!
//! # Design Decisions
//! - Relative URIs always target the origin; absolute URIs are fetched as-is
//! - No redirect following on the origin path; a 3xx comes back verbatim and
//!   the storage guard refuses it
//! - The hyper client pools origin connections; reqwest only sees the few
//!   CDN entries of the precache manifest

use async_trait::async_trait;
use axum::body::Body;
use axum::http::uri::{Authority, InvalidUri, Scheme};
use axum::http::{Request, Response, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::UpstreamConfig;

/// Error type for upstream fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid upstream URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("third-party fetch failed: {0}")]
    ThirdParty(#[from] reqwest::Error),

    /// Connection-level failure, for fetchers that detect unreachability
    /// without a transport error to wrap.
    #[error("network unreachable")]
    Unreachable,
}

/// The seam between routing policy and the network.
///
/// Production uses [`UpstreamClient`]; tests substitute scripted fetchers to
/// drive every fallback path without sockets.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform one network fetch. Exactly one response or one error per call.
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>, FetchError>;

    /// Whether a URI targets the configured origin. Relative URIs do by
    /// construction.
    fn is_same_origin(&self, uri: &Uri) -> bool {
        uri.authority().is_none()
    }
}

/// HTTP client fronting the origin server.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    tls_client: reqwest::Client,
    origin: Authority,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, InvalidUri> {
        let origin: Authority = config.origin.parse()?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            client,
            tls_client: reqwest::Client::new(),
            origin,
        })
    }

    /// Fetch an absolute https URL through reqwest and rebuild an axum
    /// response from it.
    async fn fetch_third_party(
        &self,
        request: Request<Body>,
    ) -> Result<Response<Body>, FetchError> {
        let (parts, _body) = request.into_parts();
        let url = parts.uri.to_string();

        let upstream = self
            .tls_client
            .request(parts.method, url)
            .headers(parts.headers)
            .send()
            .await?;

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let body = upstream.bytes().await?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[async_trait]
impl Fetch for UpstreamClient {
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>, FetchError> {
        if request.uri().scheme_str() == Some("https") {
            return self.fetch_third_party(request).await;
        }

        let (mut parts, body) = request.into_parts();

        // Relative URIs are rewritten to the origin; absolute http URIs are
        // forwarded to whatever authority they carry.
        let mut uri_parts = parts.uri.into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        if uri_parts.authority.is_none() {
            uri_parts.authority = Some(self.origin.clone());
        }
        parts.uri = Uri::from_parts(uri_parts)?;

        let response = self
            .client
            .request(Request::from_parts(parts, body))
            .await?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }

    fn is_same_origin(&self, uri: &Uri) -> bool {
        match uri.authority() {
            None => true,
            Some(authority) => *authority == self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;

    fn client() -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            origin: "127.0.0.1:3000".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn relative_uri_is_same_origin() {
        let client = client();
        assert!(client.is_same_origin(&"/css/app.css".parse().unwrap()));
    }

    #[test]
    fn matching_authority_is_same_origin() {
        let client = client();
        assert!(client.is_same_origin(&"http://127.0.0.1:3000/a".parse().unwrap()));
        assert!(!client.is_same_origin(&"https://cdn.jsdelivr.net/x.css".parse().unwrap()));
    }
}
