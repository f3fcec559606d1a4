use std::sync::Arc;

use roost_client::RemoteApi;
use roost_core::{Information, MediaId, MediaUpload, OperationResult, ProxyConfig, SubmittedFile};
use serde_json::Value;

use crate::cache::CacheStore;
use crate::services::publish::{UpdateOptions, UploadOrchestrator};
use crate::services::read::ReadOrchestrator;

/// Use-case entry points exposed to the HTTP boundary.
///
/// Every operation returns an [`OperationResult`]; no error escapes as a `Result`.
#[derive(Clone)]
pub struct TwitterProxy {
    reads: ReadOrchestrator,
    uploads: UploadOrchestrator,
}

impl TwitterProxy {
    pub fn new(remote: Arc<dyn RemoteApi>, cache: Arc<dyn CacheStore>, config: ProxyConfig) -> Self {
        let reads = ReadOrchestrator::new(remote.clone(), cache, Arc::new(config));
        let uploads = UploadOrchestrator::new(remote, reads.clone());
        Self { reads, uploads }
    }

    pub fn config(&self) -> &ProxyConfig {
        self.reads.config()
    }

    pub async fn post_text(&self, text: &str) -> OperationResult<Information> {
        self.uploads.post_text(text).await
    }

    pub async fn post_with_media(
        &self,
        text: &str,
        files: Vec<SubmittedFile>,
    ) -> OperationResult<Information> {
        self.uploads.post_with_media(text, files).await
    }

    pub async fn post_update(
        &self,
        status: &str,
        media_ids: &[String],
        options: &UpdateOptions,
    ) -> OperationResult<Value> {
        self.uploads.post_update(status, media_ids, options).await
    }

    pub async fn upload_single_media(&self, upload: MediaUpload) -> OperationResult<MediaId> {
        self.uploads.upload_single_media(upload).await
    }

    pub async fn delete_tweet(&self, id: &str) -> OperationResult<Information> {
        self.reads.delete_tweet(id).await
    }

    pub async fn fetch_user_timeline(&self, force: bool) -> OperationResult<Value> {
        self.reads.fetch_user_timeline(force).await
    }

    pub async fn fetch_mentions(&self, force: bool) -> OperationResult<Value> {
        self.reads.fetch_mentions(force).await
    }

    pub async fn search(&self, query: &str, count: u32, force: bool) -> OperationResult<Value> {
        self.reads.search(query, count, force).await
    }

    /// Search with the configured query and count.
    pub async fn search_default(&self, force: bool) -> OperationResult<Value> {
        let config = self.reads.config();
        self.reads
            .search(&config.search_query, config.search_count, force)
            .await
    }
}
