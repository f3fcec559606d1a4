//! Read orchestrator
//!
//! Cache-then-fetch-then-cache for the timeline, mentions and search reads, plus
//! tweet deletion (which re-warms the timeline cache).

use std::sync::Arc;
use std::time::Duration;

use roost_client::{params, RemoteApi};
use roost_core::constants::MSG_TWEET_DELETED;
use roost_core::{Information, OperationResult, ProxyConfig, RemoteCallError, TweetReference};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::{is_empty_value, CacheKey, CacheStore};

/// A cacheable read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadKind {
    UserTimeline,
    Mentions,
    Search { query: String, count: u32 },
}

impl ReadKind {
    pub fn cache_key(&self) -> String {
        match self {
            ReadKind::UserTimeline => CacheKey::USER_TIMELINE.to_string(),
            ReadKind::Mentions => CacheKey::MENTIONS.to_string(),
            ReadKind::Search { query, count } => CacheKey::search(query, *count),
        }
    }

    /// Name used in log lines and "Failed to get ..." messages.
    pub fn name(&self) -> &'static str {
        match self {
            ReadKind::UserTimeline => "user_timeline",
            ReadKind::Mentions => "mentions_timeline",
            ReadKind::Search { .. } => "search",
        }
    }
}

#[derive(Clone)]
pub struct ReadOrchestrator {
    remote: Arc<dyn RemoteApi>,
    cache: Arc<dyn CacheStore>,
    config: Arc<ProxyConfig>,
}

impl ReadOrchestrator {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        cache: Arc<dyn CacheStore>,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            remote,
            cache,
            config,
        }
    }

    /// Serve from cache unless `force`, otherwise call the remote API and store the result.
    ///
    /// A failed remote call leaves any existing entry in place.
    #[instrument(skip(self, kind), fields(kind = kind.name()))]
    pub async fn fetch(&self, kind: &ReadKind, force: bool) -> OperationResult<Value> {
        let key = kind.cache_key();

        if !force {
            match self.cache.get(&key).await {
                Ok(Some(value)) if !is_empty_value(&value) => {
                    debug!("Cache hit");
                    return OperationResult::ok(value);
                }
                Ok(_) => debug!("Cache miss"),
                Err(e) => warn!(error = %e, "Cache read failed, falling through to remote"),
            }
        }

        match self.fetch_remote(kind).await {
            Ok(value) => {
                let ttl = Duration::from_secs(self.config.cache_ttl_secs);
                if let Err(e) = self.cache.put(&key, value.clone(), ttl).await {
                    warn!(error = %e, "Cache write failed");
                }
                OperationResult::ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Remote read failed");
                OperationResult::from_error(e)
            }
        }
    }

    async fn fetch_remote(&self, kind: &ReadKind) -> Result<Value, RemoteCallError> {
        let count = match kind {
            ReadKind::Search { count, .. } => count.to_string(),
            _ => self.config.timeline_count.to_string(),
        };
        match kind {
            ReadKind::UserTimeline => {
                let query = params([
                    ("screen_name", self.config.screen_name.clone()),
                    ("count", count),
                ]);
                self.remote.get("statuses/user_timeline", &query).await
            }
            ReadKind::Mentions => {
                let query = params([("count", count)]);
                self.remote.get("statuses/mentions_timeline", &query).await
            }
            ReadKind::Search { query: q, .. } => {
                let query = params([
                    ("q", q.clone()),
                    ("count", count),
                    ("result_type", "recent".to_string()),
                ]);
                let mut response = self.remote.get("search/tweets", &query).await?;
                Ok(response
                    .get_mut("statuses")
                    .map(Value::take)
                    .unwrap_or_else(|| Value::Array(Vec::new())))
            }
        }
    }

    pub async fn fetch_user_timeline(&self, force: bool) -> OperationResult<Value> {
        self.fetch(&ReadKind::UserTimeline, force).await
    }

    pub async fn fetch_mentions(&self, force: bool) -> OperationResult<Value> {
        self.fetch(&ReadKind::Mentions, force).await
    }

    pub async fn search(&self, query: &str, count: u32, force: bool) -> OperationResult<Value> {
        let kind = ReadKind::Search {
            query: query.to_string(),
            count,
        };
        self.fetch(&kind, force).await
    }

    /// Re-fetch the user timeline after a write. Failures are logged only.
    pub async fn refresh_user_timeline(&self) -> OperationResult<Value> {
        let refreshed = self.fetch_user_timeline(true).await;
        if refreshed.has_errors() {
            warn!(errors = ?refreshed.errors, "Timeline refresh after write failed");
        }
        refreshed
    }

    #[instrument(skip(self))]
    pub async fn delete_tweet(&self, id: &str) -> OperationResult<Information> {
        let deleted = match self.remote.post(&format!("statuses/destroy/{id}"), &[]).await {
            Ok(status) => {
                // The tweet is gone even if the echoed status cannot be read back
                self.refresh_user_timeline().await;
                self.information(MSG_TWEET_DELETED, &status)
            }
            Err(e) => Err(e),
        };

        match deleted {
            Ok(info) => OperationResult::ok(info),
            Err(e) => {
                warn!(error = %e, "Delete failed");
                OperationResult::from_error(e)
            }
        }
    }

    /// Success payload with a permalink built from a status object.
    pub(crate) fn information(&self, text: &str, status: &Value) -> Result<Information, RemoteCallError> {
        let reference = TweetReference::from_status(status).ok_or_else(|| {
            RemoteCallError::Decode("status has no user.screen_name or id_str".to_string())
        })?;
        Ok(Information {
            text: text.to_string(),
            url: reference.permalink(&self.config.permalink_base),
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::testing::{status_json, MockRemote};
    use serde_json::json;
    use std::num::NonZeroUsize;

    fn setup(remote: MockRemote) -> (Arc<MockRemote>, Arc<MemoryCache>, ReadOrchestrator) {
        let remote = Arc::new(remote);
        let cache = Arc::new(MemoryCache::new(NonZeroUsize::new(16).unwrap()));
        let reads = ReadOrchestrator::new(
            remote.clone(),
            cache.clone(),
            Arc::new(ProxyConfig::new("rtainjapan")),
        );
        (remote, cache, reads)
    }

    #[tokio::test]
    async fn test_cold_then_warm_timeline() {
        let remote = MockRemote::new().on_get("statuses/user_timeline", Ok(json!([{"id_str": "1"}])));
        let (remote, _cache, reads) = setup(remote);

        let first = reads.fetch_user_timeline(false).await;
        let second = reads.fetch_user_timeline(false).await;

        assert_eq!(remote.call_count("statuses/user_timeline"), 1);
        assert_eq!(first, second);
        assert_eq!(first.data, Some(json!([{"id_str": "1"}])));

        let call = &remote.calls()[0];
        assert!(call.params.contains(&("screen_name".to_string(), "rtainjapan".to_string())));
        assert!(call.params.contains(&("count".to_string(), "10".to_string())));
    }

    #[tokio::test]
    async fn test_force_bypasses_cache() {
        let remote = MockRemote::new().on_get("statuses/mentions_timeline", Ok(json!([{"id_str": "2"}])));
        let (remote, _cache, reads) = setup(remote);

        reads.fetch_mentions(false).await;
        reads.fetch_mentions(true).await;
        assert_eq!(remote.call_count("statuses/mentions_timeline"), 2);
    }

    #[tokio::test]
    async fn test_empty_cached_value_is_a_miss() {
        let remote = MockRemote::new().on_get("statuses/user_timeline", Ok(json!([])));
        let (remote, _cache, reads) = setup(remote);

        reads.fetch_user_timeline(false).await;
        reads.fetch_user_timeline(false).await;
        assert_eq!(remote.call_count("statuses/user_timeline"), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_entry() {
        let remote = MockRemote::new().on_get(
            "statuses/user_timeline",
            Err(RemoteCallError::Transport("timeout".into())),
        );
        let (remote, cache, reads) = setup(remote);
        cache
            .put(CacheKey::USER_TIMELINE, json!([{"id_str": "old"}]), Duration::from_secs(60))
            .await
            .unwrap();

        let forced = reads.fetch_user_timeline(true).await;
        assert_eq!(forced.errors, vec!["timeout"]);
        assert!(forced.data.is_none());

        let cached = reads.fetch_user_timeline(false).await;
        assert_eq!(cached.data, Some(json!([{"id_str": "old"}])));
        assert_eq!(remote.call_count("statuses/user_timeline"), 1);
    }

    #[tokio::test]
    async fn test_search_caches_statuses() {
        let remote = MockRemote::new().on_get(
            "search/tweets",
            Ok(json!({"statuses": [{"id_str": "3"}], "search_metadata": {}})),
        );
        let (remote, cache, reads) = setup(remote);

        let result = reads.search("#RTAinJapan", 15, false).await;
        assert_eq!(result.data, Some(json!([{"id_str": "3"}])));
        assert_eq!(
            cache.get(&CacheKey::search("#RTAinJapan", 15)).await.unwrap(),
            Some(json!([{"id_str": "3"}]))
        );

        let call = &remote.calls()[0];
        assert!(call.params.contains(&("result_type".to_string(), "recent".to_string())));

        reads.search("#RTAinJapan", 15, false).await;
        assert_eq!(remote.call_count("search/tweets"), 1);
    }

    #[tokio::test]
    async fn test_delete_refreshes_timeline() {
        let remote = MockRemote::new()
            .on_post("statuses/destroy/123456", Ok(status_json("rtainjapan", "123456")))
            .on_get("statuses/user_timeline", Ok(json!([{"id_str": "9"}])));
        let (remote, cache, reads) = setup(remote);

        let result = reads.delete_tweet("123456").await;
        assert!(result.errors.is_empty());
        let info = result.data.unwrap();
        assert_eq!(info.text, MSG_TWEET_DELETED);
        assert_eq!(info.url, "https://twitter.com/rtainjapan/status/123456");

        assert_eq!(remote.call_count("statuses/user_timeline"), 1);
        assert_eq!(
            cache.get(CacheKey::USER_TIMELINE).await.unwrap(),
            Some(json!([{"id_str": "9"}]))
        );
    }

    #[tokio::test]
    async fn test_delete_without_permalink_still_refreshes() {
        let remote = MockRemote::new()
            .on_post("statuses/destroy/123456", Ok(json!({})))
            .on_get("statuses/user_timeline", Ok(json!([{"id_str": "9"}])));
        let (remote, cache, reads) = setup(remote);

        let result = reads.delete_tweet("123456").await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.data.is_none());

        assert_eq!(remote.call_count("statuses/user_timeline"), 1);
        assert_eq!(
            cache.get(CacheKey::USER_TIMELINE).await.unwrap(),
            Some(json!([{"id_str": "9"}]))
        );
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_cache_untouched() {
        let remote = MockRemote::new().on_post(
            "statuses/destroy/123456",
            Err(RemoteCallError::Api {
                status: 404,
                message: "No status found with that ID.".into(),
            }),
        );
        let (remote, cache, reads) = setup(remote);
        cache
            .put(CacheKey::USER_TIMELINE, json!([{"id_str": "old"}]), Duration::from_secs(60))
            .await
            .unwrap();

        let result = reads.delete_tweet("123456").await;
        assert_eq!(result.errors, vec!["No status found with that ID."]);
        assert!(result.data.is_none());
        assert_eq!(remote.call_count("statuses/user_timeline"), 0);
        assert_eq!(
            cache.get(CacheKey::USER_TIMELINE).await.unwrap(),
            Some(json!([{"id_str": "old"}]))
        );
    }
}
