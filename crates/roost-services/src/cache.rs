//! Cache gateway: key/value store with per-entry expiry.
//!
//! Only read operations are memoized. Writes to the same key are
//! last-writer-wins; values are whole snapshots.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use roost_core::CacheDriver;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Live value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// Cache keys used by the read orchestrator.
pub struct CacheKey;

impl CacheKey {
    pub const USER_TIMELINE: &'static str = "user_timelines";
    pub const MENTIONS: &'static str = "mentions_timelines";

    /// Stable key for a search: hex SHA-256 of the operation name and parameters.
    pub fn search(query: &str, count: u32) -> String {
        let digest = Sha256::digest(format!("search_tweet_{query}_{count}").as_bytes());
        hex::encode(digest)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Bounded in-process LRU cache.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if !entry.is_expired() {
            return Ok(Some(entry.value.clone()));
        }
        entries.pop(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .await
            .put(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

/// One JSON file per key. Writes go through a temp file and an atomic rename.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are hashed so arbitrary strings map to safe file names
        let name = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{name}.json"))
    }
}

fn write_entry(dir: &Path, path: &Path, entry: &CacheEntry) -> Result<(), CacheError> {
    std::fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut temp, entry)?;
    temp.persist(path).map_err(|e| CacheError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = serde_json::from_slice(&bytes)?;
        if entry.is_expired() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!(error = %e, key, "Failed to remove expired cache file");
            }
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let dir = self.dir.clone();
        let path = self.entry_path(key);
        let entry = CacheEntry::new(value, ttl);
        tokio::task::spawn_blocking(move || write_entry(&dir, &path, &entry))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))?
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path).await?;
            }
        }
        Ok(())
    }
}

/// Build the store selected by configuration.
pub fn build_cache(driver: &CacheDriver) -> Arc<dyn CacheStore> {
    match driver {
        CacheDriver::Memory { capacity } => Arc::new(MemoryCache::new(
            NonZeroUsize::new(*capacity).unwrap_or(NonZeroUsize::MIN),
        )),
        CacheDriver::Files { path } => Arc::new(FileCache::new(path.clone())),
    }
}

/// `null`, `[]`, `{}` and `""` count as cache misses.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    fn memory() -> MemoryCache {
        MemoryCache::new(NonZeroUsize::new(2).unwrap())
    }

    #[test]
    fn test_search_key_is_stable() {
        let a = CacheKey::search("#RTAinJapan exclude:retweets", 15);
        let b = CacheKey::search("#RTAinJapan exclude:retweets", 15);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, CacheKey::search("#RTAinJapan exclude:retweets", 16));
        assert_eq!(
            CacheKey::search("q", 1),
            hex::encode(Sha256::digest(b"search_tweet_q_1"))
        );
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!([1])));
        assert!(!is_empty_value(&json!(0)));
    }

    #[tokio::test]
    async fn test_memory_roundtrip_and_overwrite() {
        let cache = memory();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.put("k", json!([1]), TTL).await.unwrap();
        cache.put("k", json!([2]), TTL).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!([2])));

        cache.clear().await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_expiry() {
        let cache = memory();
        cache.put("k", json!([1]), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_evicts_least_recent() {
        let cache = memory();
        cache.put("a", json!(1), TTL).await.unwrap();
        cache.put("b", json!(2), TTL).await.unwrap();
        cache.get("a").await.unwrap();
        cache.put("c", json!(3), TTL).await.unwrap();

        assert_eq!(cache.get("b").await.unwrap(), None);
        assert_eq!(cache.get("a").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));

        assert_eq!(cache.get("user_timelines").await.unwrap(), None);
        cache
            .put("user_timelines", json!([{"id_str": "1"}]), TTL)
            .await
            .unwrap();
        assert_eq!(
            cache.get("user_timelines").await.unwrap(),
            Some(json!([{"id_str": "1"}]))
        );

        cache.clear().await.unwrap();
        assert_eq!(cache.get("user_timelines").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_cache_expired_entry_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("k", json!([1]), Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.entry_path("k").exists());
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_entry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        std::fs::write(cache.entry_path("k"), b"not json").unwrap();
        assert!(matches!(
            cache.get("k").await,
            Err(CacheError::Serialization(_))
        ));
    }
}
