//! Transport tests against a local mock server.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use subscrforge_collector::config::{CacheSetting, ClientConfig};
use subscrforge_collector::transport::{CachePolicy, CacheStore, ClientTransport, FileCacheStore};
use subscrforge_collector::Error;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(cache: CacheSetting, rate_limit: &str, cache_dir: &Path) -> ClientConfig {
    ClientConfig {
        cache,
        rate_limit: rate_limit.to_string(),
        cache_dir: Some(cache_dir.to_path_buf()),
        ..ClientConfig::default()
    }
}

async fn get(transport: &ClientTransport, url: &str) -> subscrforge_collector::Response {
    let request = transport.client().get(url).build().unwrap();
    transport.handle(request).await.unwrap()
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post.info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"body":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transport =
        ClientTransport::new(&config(CacheSetting::Enabled(true), "10 req/s", dir.path()))
            .unwrap();
    assert_eq!(transport.policy(), CachePolicy::Force);

    let url = format!("{}/post.info?postId=1", server.uri());
    let first = get(&transport, &url).await;
    assert!(!first.from_cache());

    let second = get(&transport, &url).await;
    assert!(second.from_cache());
    assert_eq!(second.status(), 200);
    assert_eq!(second.text(), r#"{"body":{}}"#);
}

#[tokio::test]
async fn test_cache_hit_does_not_wait_for_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/creator.get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transport =
        ClientTransport::new(&config(CacheSetting::Enabled(true), "1 req/s", dir.path()))
            .unwrap();

    let url = format!("{}/creator.get?creatorId=abc", server.uri());
    get(&transport, &url).await;

    let start = Instant::now();
    for _ in 0..3 {
        assert!(get(&transport, &url).await.from_cache());
    }
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transport =
        ClientTransport::new(&config(CacheSetting::Enabled(false), "2 req/s", dir.path()))
            .unwrap();

    let start = Instant::now();
    for i in 0..3 {
        get(&transport, &format!("{}/page/{}", server.uri(), i)).await;
    }
    assert!(start.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_disabled_cache_always_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plan.listSupporting"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"body":[]}"#))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transport =
        ClientTransport::new(&config(CacheSetting::Enabled(false), "10 req/s", dir.path()))
            .unwrap();
    assert_eq!(transport.policy(), CachePolicy::Bypass);

    let url = format!("{}/plan.listSupporting", server.uri());
    assert!(!get(&transport, &url).await.from_cache());
    assert!(!get(&transport, &url).await.from_cache());
}

#[tokio::test]
async fn test_error_responses_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transport =
        ClientTransport::new(&config(CacheSetting::Enabled(true), "10 req/s", dir.path()))
            .unwrap();

    let url = format!("{}/newsletter.list", server.uri());
    assert_eq!(get(&transport, &url).await.status(), 503);
    assert!(!get(&transport, &url).await.from_cache());
}

#[tokio::test]
async fn test_follow_headers_respects_no_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).insert_header("cache-control", "no-store"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200).insert_header("cache-control", "max-age=60"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = config(CacheSetting::Enabled(true), "10 req/s", dir.path());
    config.follow_cache_control = true;
    let transport = ClientTransport::new(&config).unwrap();
    assert_eq!(transport.policy(), CachePolicy::FollowHeaders);

    let private = format!("{}/private", server.uri());
    get(&transport, &private).await;
    assert!(!get(&transport, &private).await.from_cache());

    let public = format!("{}/public", server.uri());
    get(&transport, &public).await;
    assert!(get(&transport, &public).await.from_cache());
}

#[tokio::test]
async fn test_custom_store_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileCacheStore::open(dir.path().join("custom")).unwrap());
    let transport = ClientTransport::with_store(
        &config(CacheSetting::Seconds(60), "10 req/s", dir.path()),
        store.clone(),
    )
    .unwrap();

    let url = format!("{}/creator.get?userId=1", server.uri());
    let request = transport.client().get(&url).build().unwrap();
    let key = subscrforge_collector::transport::cache_key(&request);
    transport.handle(request).await.unwrap();

    let cached = store.retrieve(&key).await.unwrap().unwrap();
    assert_eq!(cached.text(), "stored");
}

#[tokio::test]
async fn test_connect_failures_retry_then_fail() {
    let dir = TempDir::new().unwrap();
    let mut config = config(CacheSetting::Enabled(false), "100 req/s", dir.path());
    config.retries = 2;
    let transport = ClientTransport::new(&config).unwrap();

    let request = transport
        .client()
        .get("http://127.0.0.1:1/post.info")
        .build()
        .unwrap();

    let start = Instant::now();
    let err = transport.handle(request).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(err.to_string().contains("after 2 retries"));
    // 250ms then 500ms of backoff.
    assert!(start.elapsed() >= Duration::from_millis(750));
}
