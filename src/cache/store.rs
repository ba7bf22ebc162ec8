//! Versioned cache namespaces.
//!
//! # Responsibilities
//! - Hold one key→snapshot map per version tag
//! - Create namespaces on open, destroy them on eviction
//! - Report namespace tags and sizes for status and metrics
//!
//! # Design Decisions
//! - DashMap at both levels: concurrent reads/writes without an outer lock
//! - Writes to the same key are last-writer-wins; a write is observed only
//!   after it completes, which is all the fetch paths need
//! - Eviction compares tags only; the store does not know which tag is
//!   "current" beyond what the caller passes in

use std::sync::Arc;

use dashmap::DashMap;

use crate::cache::entry::{CacheKey, CachedResponse};
use crate::observability::metrics;

/// One versioned namespace: key → materialized response.
pub type Namespace = Arc<DashMap<CacheKey, CachedResponse>>;

/// Concurrency-safe store of versioned cache namespaces.
#[derive(Clone, Default)]
pub struct CacheStore {
    namespaces: Arc<DashMap<String, Namespace>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the namespace for `version`, creating it if absent.
    pub fn open(&self, version: &str) -> Namespace {
        self.namespaces
            .entry(version.to_string())
            .or_default()
            .clone()
    }

    /// Look up a snapshot under `version`. Returns a clone; the body bytes
    /// are shared, not copied.
    pub fn get(&self, version: &str, key: &CacheKey) -> Option<CachedResponse> {
        self.namespaces
            .get(version)
            .and_then(|ns| ns.get(key).map(|entry| entry.value().clone()))
    }

    /// Store a snapshot under `version`, creating the namespace if needed.
    pub fn put(&self, version: &str, key: CacheKey, response: CachedResponse) {
        let ns = self.open(version);
        ns.insert(key, response);
        metrics::record_cache_entries(version, ns.len());
    }

    /// Number of entries in a namespace, or 0 if it does not exist.
    pub fn len(&self, version: &str) -> usize {
        self.namespaces.get(version).map(|ns| ns.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, version: &str) -> bool {
        self.len(version) == 0
    }

    /// Tags of every namespace currently held.
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.iter().map(|e| e.key().clone()).collect()
    }

    /// Destroy one namespace and all its entries.
    pub fn remove(&self, version: &str) {
        self.namespaces.remove(version);
    }

    /// Delete every namespace whose tag differs from `current`.
    ///
    /// Returns the evicted tags. Runs at activation so a new deploy starts
    /// serving only its own assets.
    pub fn evict_stale(&self, current: &str) -> Vec<String> {
        let stale: Vec<String> = self
            .namespaces
            .iter()
            .map(|e| e.key().clone())
            .filter(|tag| tag != current)
            .collect();

        for tag in &stale {
            self.namespaces.remove(tag);
            tracing::info!(namespace = %tag, "Evicted stale cache namespace");
            metrics::record_eviction(tag);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Response, StatusCode};

    async fn snapshot(body: &'static str) -> CachedResponse {
        let response = Response::builder()
            .status(StatusCode::OK)
            .body(Body::from(body))
            .unwrap();
        CachedResponse::materialize(response, false, 1024).await.unwrap()
    }

    #[tokio::test]
    async fn put_then_get_same_version() {
        let store = CacheStore::new();
        let key = CacheKey::from_path_and_query("/css/app.css");

        assert!(store.get("v1", &key).is_none());
        store.put("v1", key.clone(), snapshot("a").await);

        let hit = store.get("v1", &key).unwrap();
        assert_eq!(hit.body().as_ref(), b"a");

        // Different version tag sees nothing.
        assert!(store.get("v2", &key).is_none());
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let store = CacheStore::new();
        let key = CacheKey::from_path_and_query("/app.js");
        store.put("v1", key.clone(), snapshot("old").await);
        store.put("v1", key.clone(), snapshot("new").await);
        assert_eq!(store.get("v1", &key).unwrap().body().as_ref(), b"new");
        assert_eq!(store.len("v1"), 1);
    }

    #[tokio::test]
    async fn evict_stale_keeps_only_current() {
        let store = CacheStore::new();
        let key = CacheKey::from_path_and_query("/a");
        store.put("v1", key.clone(), snapshot("1").await);
        store.put("v2", key.clone(), snapshot("2").await);
        store.put("current", key.clone(), snapshot("3").await);

        let mut evicted = store.evict_stale("current");
        evicted.sort();
        assert_eq!(evicted, vec!["v1".to_string(), "v2".to_string()]);
        assert_eq!(store.namespaces(), vec!["current".to_string()]);
        assert_eq!(store.get("current", &key).unwrap().body().as_ref(), b"3");
    }

    #[test]
    fn open_is_idempotent() {
        let store = CacheStore::new();
        store.open("v1");
        store.open("v1");
        assert_eq!(store.namespaces().len(), 1);
        assert!(store.is_empty("v1"));
    }
}
