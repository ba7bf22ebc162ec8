//! End-to-end tests through real sockets: mock origin, full middleware
//! stack, reqwest client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cachegate::cache::CacheStore;
use cachegate::config::GatewayConfig;
use cachegate::http::HttpServer;
use cachegate::lifecycle::Shutdown;
use cachegate::routing::CacheRouter;
use cachegate::upstream::UpstreamClient;

mod common;

fn gateway_config(proxy: SocketAddr, origin: SocketAddr, precache: &[&str]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = proxy.to_string();
    config.upstream.origin = origin.to_string();
    config.cache.version = "test-v1".to_string();
    config.cache.precache = precache.iter().map(|s| s.to_string()).collect();
    config
}

async fn serve(config: &GatewayConfig, router: Arc<CacheRouter>, shutdown: &Shutdown) {
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let server = HttpServer::new(config, router);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn static_assets_hit_origin_once() {
    let origin_addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28282".parse().unwrap();

    let asset_hits = Arc::new(AtomicU32::new(0));
    let hits = asset_hits.clone();
    common::start_scripted_origin(origin_addr, move |path| {
        if path == "/js/app.js" {
            hits.fetch_add(1, Ordering::SeqCst);
        }
        (200, format!("content of {}", path))
    })
    .await;

    let config = gateway_config(proxy_addr, origin_addr, &[]);
    let store = CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = Arc::new(CacheRouter::new(&config.cache, store, client));

    let shutdown = Shutdown::new();
    serve(&config, router, &shutdown).await;

    let client = common::test_client();
    let url = format!("http://{}/js/app.js", proxy_addr);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), 200);
    assert_eq!(first.text().await.unwrap(), "content of /js/app.js");

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.text().await.unwrap(), "content of /js/app.js");

    // Second request was served from cache.
    assert_eq!(asset_hits.load(Ordering::SeqCst), 1);
    shutdown.trigger();
}

#[tokio::test]
async fn api_requests_are_always_fresh() {
    let origin_addr: SocketAddr = "127.0.0.1:28283".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28284".parse().unwrap();

    let counter = Arc::new(AtomicU32::new(0));
    let c = counter.clone();
    common::start_scripted_origin(origin_addr, move |_| {
        (200, format!("fresh-{}", c.fetch_add(1, Ordering::SeqCst)))
    })
    .await;

    let config = gateway_config(proxy_addr, origin_addr, &[]);
    let store = CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = Arc::new(CacheRouter::new(&config.cache, store, client));

    let shutdown = Shutdown::new();
    serve(&config, router, &shutdown).await;

    let client = common::test_client();
    let url = format!("http://{}/api/notification-count", proxy_addr);

    let first = client.get(&url).send().await.unwrap().text().await.unwrap();
    let second = client.get(&url).send().await.unwrap().text().await.unwrap();
    assert_eq!(first, "fresh-0");
    assert_eq!(second, "fresh-1");
    shutdown.trigger();
}

#[tokio::test]
async fn page_navigation_survives_origin_outage() {
    let origin_addr: SocketAddr = "127.0.0.1:28285".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28286".parse().unwrap();
    // Nothing ever listens here.
    let dead_origin: SocketAddr = "127.0.0.1:28287".parse().unwrap();

    common::start_scripted_origin(origin_addr, |path| (200, format!("page {}", path))).await;

    // Install against the live origin.
    let config = gateway_config(proxy_addr, origin_addr, &["/chat"]);
    let store = CacheStore::new();
    let live = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = CacheRouter::new(&config.cache, store.clone(), live);
    router.install().await.unwrap();
    router.activate();

    // Serve with the origin gone: same store and version, dead upstream.
    let offline_config = gateway_config(proxy_addr, dead_origin, &["/chat"]);
    let dead = Arc::new(UpstreamClient::new(&offline_config.upstream).unwrap());
    let router = Arc::new(CacheRouter::new(&offline_config.cache, store, dead));

    let shutdown = Shutdown::new();
    serve(&offline_config, router, &shutdown).await;

    let client = common::test_client();

    // Precached navigation falls back to its snapshot.
    let res = client
        .get(format!("http://{}/chat", proxy_addr))
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "page /chat");

    // Unknown navigation yields an explicit error, not a hang.
    let res = client
        .get(format!("http://{}/profile/alice", proxy_addr))
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    shutdown.trigger();
}

#[tokio::test]
async fn install_failure_aborts_before_serving() {
    // Origin that rejects one manifest entry.
    let origin_addr: SocketAddr = "127.0.0.1:28288".parse().unwrap();
    common::start_scripted_origin(origin_addr, |path| {
        if path == "/js/pwa.js" {
            (500, "broken asset".to_string())
        } else {
            (200, format!("content of {}", path))
        }
    })
    .await;

    let config = gateway_config(
        "127.0.0.1:28289".parse().unwrap(),
        origin_addr,
        &["/chat", "/js/pwa.js", "/css/chat-style.css"],
    );
    let store = CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = CacheRouter::new(&config.cache, store.clone(), client);

    router.install().await.unwrap_err();
    assert!(store.namespaces().is_empty());
}

#[tokio::test]
async fn connection_cap_queues_rather_than_rejects() {
    let origin_addr: SocketAddr = "127.0.0.1:28292".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28293".parse().unwrap();

    common::start_scripted_origin(origin_addr, |path| (200, format!("content of {}", path))).await;

    let mut config = gateway_config(proxy_addr, origin_addr, &[]);
    config.listener.max_connections = 1;

    let store = CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = Arc::new(CacheRouter::new(&config.cache, store, client));

    let shutdown = Shutdown::new();
    serve(&config, router, &shutdown).await;

    // With a single permit, concurrent requests serialize behind the
    // semaphore; all of them must still complete.
    let client = common::test_client();
    let mut handles = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        let url = format!("http://{}/api/messages/{}", proxy_addr, i);
        handles.push(tokio::spawn(async move {
            client.get(&url).send().await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 200);
    }
    shutdown.trigger();
}

#[tokio::test]
async fn status_endpoint_reports_namespaces() {
    let origin_addr: SocketAddr = "127.0.0.1:28290".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28291".parse().unwrap();

    common::start_scripted_origin(origin_addr, |path| (200, format!("content of {}", path))).await;

    let config = gateway_config(proxy_addr, origin_addr, &["/css/chat-style.css"]);
    let store = CacheStore::new();
    let client = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let router = Arc::new(CacheRouter::new(&config.cache, store, client));
    router.install().await.unwrap();
    router.activate();

    let shutdown = Shutdown::new();
    serve(&config, router, &shutdown).await;

    let client = common::test_client();
    let body: serde_json::Value = client
        .get(format!("http://{}/internal/status", proxy_addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["version"], "test-v1");
    assert_eq!(body["namespaces"][0]["tag"], "test-v1");
    assert_eq!(body["namespaces"][0]["entries"], 1);
    shutdown.trigger();
}
