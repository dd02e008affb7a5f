//! On-disk HTTP response cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::transport::response::Response;

/// Storage backend for cached responses, addressed by cache key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a fresh entry. Expired entries read as absent.
    async fn retrieve(&self, key: &str) -> Result<Option<Response>>;

    /// Store a response for `ttl`.
    async fn store(&self, key: &str, response: &Response, ttl: Duration) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Metadata line written before the body of each entry.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
    status: u16,
    headers: Vec<(String, String)>,
    url: String,
    stored_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl EntryMetadata {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// One file per key: a JSON metadata line followed by the raw body.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FileCacheStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Cache(format!(
                "Failed to create cache directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn decode(&self, key: &str, data: &[u8]) -> Option<(EntryMetadata, Bytes)> {
        let split = data.iter().position(|b| *b == b'\n')?;
        let metadata: EntryMetadata = match serde_json::from_slice(&data[..split]) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                return None;
            }
        };
        Some((metadata, Bytes::copy_from_slice(&data[split + 1..])))
    }
}

fn to_response(metadata: &EntryMetadata, body: Bytes) -> Result<Response> {
    let status = StatusCode::from_u16(metadata.status)
        .map_err(|e| Error::Cache(format!("Invalid cached status: {}", e)))?;

    let mut headers = HeaderMap::new();
    for (name, value) in &metadata.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }

    let url = Url::parse(&metadata.url)?;
    Ok(Response::new(status, headers, url, body).cached())
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn retrieve(&self, key: &str) -> Result<Option<Response>> {
        let path = self.entry_path(key);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Cache(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let Some((metadata, body)) = self.decode(key, &data) else {
            self.remove(key).await?;
            return Ok(None);
        };

        if metadata.is_expired() {
            tracing::debug!("Cache entry {} expired at {}", key, metadata.expires_at);
            self.remove(key).await?;
            return Ok(None);
        }

        to_response(&metadata, body).map(Some)
    }

    async fn store(&self, key: &str, response: &Response, ttl: Duration) -> Result<()> {
        let stored_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Cache(format!("Invalid cache lifetime: {}", e)))?;

        let metadata = EntryMetadata {
            status: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
            url: response.url().to_string(),
            stored_at,
            expires_at: stored_at + ttl,
        };

        let mut data = serde_json::to_vec(&metadata)?;
        data.push(b'\n');
        data.extend_from_slice(response.body());

        // Concurrent writers each use their own temp file; the rename is atomic.
        let path = self.entry_path(key);
        let temp = self.dir.join(format!(
            "{}.{}.{}.tmp",
            key,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&temp, &data)
            .await
            .map_err(|e| Error::Cache(format!("Failed to write {}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &path).await.map_err(|e| {
            Error::Cache(format!("Failed to move entry to {}: {}", path.display(), e))
        })?;

        tracing::debug!("Cached {} as {}", response.url(), key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Cache(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    fn response(body: &'static str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Response::new(
            StatusCode::OK,
            headers,
            Url::parse("https://api.fanbox.cc/post.info?postId=1").unwrap(),
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::open(dir.path()).unwrap();

        assert!(store.retrieve("k").await.unwrap().is_none());

        store
            .store("k", &response("{\"body\":\n1}"), Duration::from_secs(60))
            .await
            .unwrap();
        let cached = store.retrieve("k").await.unwrap().unwrap();
        assert!(cached.from_cache());
        assert_eq!(cached.status(), StatusCode::OK);
        assert_eq!(cached.text(), "{\"body\":\n1}");
        assert_eq!(cached.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(cached.url().query(), Some("postId=1"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::open(dir.path()).unwrap();

        store
            .store("k", &response("{}"), Duration::ZERO)
            .await
            .unwrap();
        assert!(store.retrieve("k").await.unwrap().is_none());
        assert!(!dir.path().join("k").exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("k"), b"not json\nbody").unwrap();

        assert!(store.retrieve("k").await.unwrap().is_none());
        assert!(!dir.path().join("k").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::open(dir.path().join("nested")).unwrap();
        store.remove("missing").await.unwrap();
        assert!(store.dir().is_dir());
    }
}
