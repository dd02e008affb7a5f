//! Caching, rate-limited HTTP transport.
//!
//! Every request made by a platform client goes through [`ClientTransport`]:
//!
//! 1. the request is fingerprinted with [`cache_key`];
//! 2. a fresh cache entry is returned as is, without touching the limiter;
//! 3. otherwise one limiter permit is acquired and the request is sent,
//!    retrying connection failures;
//! 4. cacheable responses are written back under the same key.

pub mod cache;
pub mod key;
pub mod limiter;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use reqwest::{Method, Request};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fs::resolve_cache_dir;

pub use cache::{CacheStore, FileCacheStore};
pub use key::cache_key;
pub use limiter::Limiter;
pub use response::Response;

/// Delay before the first connection retry; doubled on each attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// How responses are read from and written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Caching disabled: always hit the network, never store.
    Bypass,
    /// Store every successful response for the configured lifetime,
    /// ignoring `Cache-Control`.
    Force,
    /// Honour `Cache-Control` directives from the server.
    FollowHeaders,
}

/// HTTP transport shared by every request of one client.
pub struct ClientTransport {
    client: reqwest::Client,
    store: Option<Arc<dyn CacheStore>>,
    limiter: Limiter,
    max_age: u64,
    policy: CachePolicy,
    retries: u32,
}

impl ClientTransport {
    /// Build a transport from client configuration, caching to the platform
    /// cache directory (or `cache_dir` when set).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let max_age = config.cache_max_age()?;
        let store: Option<Arc<dyn CacheStore>> = if max_age == 0 {
            None
        } else {
            let dir = resolve_cache_dir(config.cache_dir.as_deref())?;
            tracing::debug!("Using response cache at {}", dir.display());
            Some(Arc::new(FileCacheStore::open(dir)?))
        };
        Self::build(config, max_age, store)
    }

    /// Build a transport backed by a custom cache store.
    pub fn with_store(config: &ClientConfig, store: Arc<dyn CacheStore>) -> Result<Self> {
        let max_age = config.cache_max_age()?;
        Self::build(config, max_age, Some(store))
    }

    fn build(
        config: &ClientConfig,
        max_age: u64,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        match &config.proxy {
            Some(proxy) => {
                tracing::debug!("Using proxy {}", proxy);
                builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
            }
            None => tracing::debug!("No proxy configured, using system proxy settings"),
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        let policy = if max_age == 0 || store.is_none() {
            CachePolicy::Bypass
        } else if config.follow_cache_control {
            CachePolicy::FollowHeaders
        } else {
            CachePolicy::Force
        };

        Ok(Self {
            client,
            store,
            limiter: Limiter::new(config.rate_limit()?),
            max_age,
            policy,
            retries: config.retries,
        })
    }

    /// The inner client, used to build requests.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// Serve a request from the cache or the network.
    pub async fn handle(&self, request: Request) -> Result<Response> {
        let key = cache_key(&request);
        let method = request.method().clone();
        let cacheable = matches!(method, Method::GET | Method::HEAD);

        let store = match (&self.store, self.policy) {
            (Some(store), CachePolicy::Force | CachePolicy::FollowHeaders) if cacheable => {
                Some(store)
            }
            _ => None,
        };

        if let Some(store) = store {
            if let Some(response) = store.retrieve(&key).await? {
                tracing::debug!("Cache hit for {} {}", method, response.url());
                return Ok(response);
            }
        }

        self.limiter.acquire().await;
        let response = self.send(request).await?;

        if let Some(store) = store {
            if let Some(ttl) = self.lifetime(&response) {
                store.store(&key, &response, ttl).await?;
            }
        }

        Ok(response)
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let Some(current) = request.try_clone() else {
                // Streaming bodies cannot be replayed.
                return Response::read(self.client.execute(request).await?).await;
            };

            match self.client.execute(current).await {
                Ok(response) => return Response::read(response).await,
                Err(e) if e.is_connect() && attempt < self.retries => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        "Connection to {} failed ({}), retry {}/{} in {:?}",
                        request.url(),
                        e,
                        attempt,
                        self.retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_connect() => {
                    return Err(Error::Network(format!(
                        "Failed to connect to {} after {} retries: {}",
                        request.url(),
                        self.retries,
                        e
                    )))
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// How long a fresh network response may be cached, if at all.
    fn lifetime(&self, response: &Response) -> Option<Duration> {
        if !response.status().is_success() {
            return None;
        }

        match self.policy {
            CachePolicy::Bypass => None,
            CachePolicy::Force => Some(Duration::from_secs(self.max_age)),
            CachePolicy::FollowHeaders => {
                let directives = response
                    .headers()
                    .get_all(CACHE_CONTROL)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .collect::<Vec<_>>()
                    .join(",");
                header_lifetime(&directives, self.max_age).map(Duration::from_secs)
            }
        }
    }
}

/// Lifetime allowed by a `Cache-Control` value, capped at `max_age` seconds.
fn header_lifetime(cache_control: &str, max_age: u64) -> Option<u64> {
    let mut lifetime = max_age;
    let mut shared_max_age = None;

    for directive in cache_control.split(',').map(str::trim) {
        let (name, value) = match directive.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim().trim_matches('"'))),
            None => (directive, None),
        };
        match name.to_ascii_lowercase().as_str() {
            "no-store" | "no-cache" | "private" => return None,
            "max-age" => {
                if let Some(seconds) = value.and_then(|v| v.parse::<u64>().ok()) {
                    lifetime = lifetime.min(seconds);
                }
            }
            "s-maxage" => shared_max_age = value.and_then(|v| v.parse::<u64>().ok()),
            _ => {}
        }
    }

    if let Some(seconds) = shared_max_age {
        lifetime = max_age.min(seconds);
    }

    (lifetime > 0).then_some(lifetime)
}

impl std::fmt::Debug for ClientTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientTransport")
            .field("policy", &self.policy)
            .field("max_age", &self.max_age)
            .field("limiter", &self.limiter)
            .field("retries", &self.retries)
            .finish()
    }
}
