use std::path::Path;

use async_trait::async_trait;
use roost_core::{MediaCategory, MediaId, RemoteCallError};
use serde_json::Value;

/// Ordered request parameters.
pub type Params = Vec<(String, String)>;

/// Request primitives the orchestrators use to reach the remote API.
///
/// Every failure is reported as a [`RemoteCallError`]. Implementations must be
/// shareable across tasks so uploads can fan out concurrently.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// GET `endpoint` with query parameters.
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError>;

    /// POST `endpoint` with form parameters.
    async fn post(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError>;

    /// Single-request media upload. Returns `media_id_string`.
    async fn upload_media(
        &self,
        path: &Path,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<MediaId, RemoteCallError>;

    /// Chunked (INIT/APPEND/FINALIZE) upload for videos and animations.
    async fn upload_chunked(
        &self,
        path: &Path,
        media_type: &str,
        category: MediaCategory,
    ) -> Result<MediaId, RemoteCallError>;
}

/// Build a parameter list from string pairs.
pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Params
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
