//! Upload orchestrator
//!
//! Turns a multipart submission into a published tweet: assemble and classify the
//! batch, validate sizes, upload media (fanning out for image batches), then issue
//! the single dependent publish call.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use roost_client::RemoteApi;
use roost_core::constants::MSG_TWEET_POSTED;
use roost_core::{
    BatchError, BatchProblem, ClassifiedUpload, Information, MediaCategory, MediaId, MediaUpload,
    OperationError, OperationResult, RemoteCallError, SubmittedFile, UploadBatch,
};
use roost_processing::{classify, sniff_file, SizeValidator};
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::read::ReadOrchestrator;

static ATTACHMENT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://twitter\.com/\S*$").expect("Invalid attachment URL regex")
});

/// Optional parameters for [`UploadOrchestrator::post_update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub in_reply_to_status_id: Option<String>,
    /// Only honoured for `http(s)://twitter.com/...` URLs.
    pub attachment_url: Option<String>,
}

/// How a validated batch is sent to the remote API.
enum UploadPlan {
    /// One video or animation through the chunked endpoint
    Streaming(ClassifiedUpload),
    /// Independent image uploads issued concurrently
    Concurrent(Vec<ClassifiedUpload>),
}

impl UploadPlan {
    fn for_batch(batch: UploadBatch) -> Self {
        let mut items = batch.into_items();
        if items.len() == 1 {
            let item = items.remove(0);
            return match item.category {
                MediaCategory::Video | MediaCategory::AnimatedImage => UploadPlan::Streaming(item),
                MediaCategory::Image => UploadPlan::Concurrent(vec![item]),
            };
        }
        UploadPlan::Concurrent(items)
    }
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    remote: Arc<dyn RemoteApi>,
    reads: ReadOrchestrator,
    validator: SizeValidator,
}

impl UploadOrchestrator {
    pub fn new(remote: Arc<dyn RemoteApi>, reads: ReadOrchestrator) -> Self {
        let validator = SizeValidator::new(reads.config().limits);
        Self {
            remote,
            reads,
            validator,
        }
    }

    /// Post `text` with the submitted files.
    ///
    /// Every per-file problem is reported together and no network call is made
    /// unless the whole batch is acceptable.
    #[instrument(skip(self, text, files), fields(files = files.len()))]
    pub async fn post_with_media(
        &self,
        text: &str,
        files: Vec<SubmittedFile>,
    ) -> OperationResult<Information> {
        let result = self.try_post(text, files).await;

        match result {
            Ok(Some(info)) => OperationResult::ok(info),
            Ok(None) => OperationResult::empty(),
            Err(e) => {
                warn!(error = %e, "Post failed");
                OperationResult::from_error(e)
            }
        }
    }

    /// Text-only post. An empty `text` is a no-op.
    pub async fn post_text(&self, text: &str) -> OperationResult<Information> {
        self.post_with_media(text, Vec::new()).await
    }

    async fn try_post(
        &self,
        text: &str,
        files: Vec<SubmittedFile>,
    ) -> Result<Option<Information>, OperationError> {
        // 1. Classify accepted files, collect per-file problems
        let batch = assemble_batch(files)?;

        if batch.is_empty() {
            if text.is_empty() {
                return Ok(None);
            }
            return self.publish(text, None).await.map(Some);
        }

        // 2. Validate sizes for the whole batch before any upload
        self.validator.validate_batch(&batch)?;

        // 3. Upload media, then publish once referencing every media id
        let media_ids = self.upload_batch(batch).await?;
        self.publish(text, Some(media_ids)).await.map(Some)
    }

    async fn upload_batch(&self, batch: UploadBatch) -> Result<String, OperationError> {
        match UploadPlan::for_batch(batch) {
            UploadPlan::Streaming(item) => Ok(self.upload_streaming(&item).await?),
            UploadPlan::Concurrent(items) => {
                let ids = self.upload_concurrently(items).await?;
                Ok(ids.join(","))
            }
        }
    }

    async fn upload_streaming(&self, item: &ClassifiedUpload) -> Result<MediaId, RemoteCallError> {
        let media_type = media_type_of(item);
        debug!(
            filename = item.upload.client_filename(),
            media_type,
            category = %item.category,
            "Streaming upload"
        );
        self.remote
            .upload_chunked(item.upload.path(), media_type, item.category)
            .await
    }

    /// Scatter one upload task per file, gather ids in submission order.
    ///
    /// The first failure aborts the remaining tasks. Ids of uploads that already
    /// finished are discarded.
    async fn upload_concurrently(
        &self,
        items: Vec<ClassifiedUpload>,
    ) -> Result<Vec<MediaId>, RemoteCallError> {
        let total = items.len();
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let remote = Arc::clone(&self.remote);
            let media_type = media_type_of(&item);
            tasks.spawn(async move {
                let upload = &item.upload;
                let result = remote
                    .upload_media(upload.path(), upload.client_filename(), Some(media_type))
                    .await;
                (index, result)
            });
        }

        let mut ids: Vec<Option<MediaId>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(id))) => ids[index] = Some(id),
                Ok((index, Err(e))) => {
                    warn!(index, error = %e, "Media upload failed, abandoning batch");
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(RemoteCallError::Transport(format!("Upload task failed: {e}")));
                }
            }
        }

        info!(count = total, "Media batch uploaded");
        ids.into_iter()
            .map(|id| id.ok_or_else(|| RemoteCallError::Transport("Upload task vanished".to_string())))
            .collect()
    }

    async fn publish(
        &self,
        text: &str,
        media_ids: Option<String>,
    ) -> Result<Information, OperationError> {
        let mut params = vec![("status".to_string(), text.to_string())];
        if let Some(media_ids) = media_ids {
            params.push(("media_ids".to_string(), media_ids));
        }

        let status = self.remote.post("statuses/update", &params).await?;
        // Published from here on, so the timeline is stale whatever the echo holds
        self.reads.refresh_user_timeline().await;
        Ok(self.reads.information(MSG_TWEET_POSTED, &status)?)
    }

    /// Upload one file and return its media id without publishing.
    #[instrument(skip(self, upload), fields(filename = upload.client_filename()))]
    pub async fn upload_single_media(&self, upload: MediaUpload) -> OperationResult<MediaId> {
        let category = classify(upload.path());
        if let Err(e) = self
            .validator
            .validate(upload.path(), category, upload.client_filename())
        {
            return OperationResult::from_error(e);
        }

        let item = ClassifiedUpload { upload, category };
        let uploaded = match item.category {
            MediaCategory::Video | MediaCategory::AnimatedImage => {
                self.upload_streaming(&item).await
            }
            MediaCategory::Image => {
                let media_type = media_type_of(&item);
                debug!(
                    declared = ?item.upload.content_type(),
                    media_type,
                    "Uploading image with sniffed type"
                );
                self.remote
                    .upload_media(
                        item.upload.path(),
                        item.upload.client_filename(),
                        Some(media_type),
                    )
                    .await
            }
        };
        OperationResult::from_result(uploaded)
    }

    /// Publish with media ids uploaded earlier, then return the refreshed timeline.
    #[instrument(skip(self, status, options), fields(media = media_ids.len()))]
    pub async fn post_update(
        &self,
        status: &str,
        media_ids: &[String],
        options: &UpdateOptions,
    ) -> OperationResult<Value> {
        let mut params = vec![("status".to_string(), status.to_string())];
        if !media_ids.is_empty() {
            params.push(("media_ids".to_string(), media_ids.join(",")));
        }
        if let Some(reply_to) = &options.in_reply_to_status_id {
            params.push(("in_reply_to_status_id".to_string(), reply_to.clone()));
        }
        if let Some(url) = &options.attachment_url {
            if ATTACHMENT_URL.is_match(url) {
                params.push(("attachment_url".to_string(), url.clone()));
            } else {
                debug!(url = %url, "Dropping attachment_url outside twitter.com");
            }
        }

        if let Err(e) = self.remote.post("statuses/update", &params).await {
            warn!(error = %e, "Update failed");
            return OperationResult::from_error(e);
        }

        let timeline = self.reads.refresh_user_timeline().await;
        OperationResult::ok(timeline.data.unwrap_or_else(|| json!([])))
    }
}

/// Walk the submitted slots in order, classifying accepted files.
fn assemble_batch(files: Vec<SubmittedFile>) -> Result<UploadBatch, BatchError> {
    let mut batch = UploadBatch::new();
    let mut problems = Vec::new();
    let mut mixed_reported = false;

    for (index, file) in files.into_iter().enumerate() {
        match file {
            SubmittedFile::NoFile => continue,
            SubmittedFile::SizeExceeded(boundary) => {
                debug!(index, ?boundary, "Upload slot exceeded size limit");
                problems.push(BatchProblem::SizeExceeded { index });
            }
            SubmittedFile::Failed => problems.push(BatchProblem::Failed { index }),
            SubmittedFile::Malformed => problems.push(BatchProblem::Malformed { index }),
            SubmittedFile::Uploaded(upload) => {
                let category = classify(upload.path());
                debug!(index, filename = upload.client_filename(), %category, "Classified upload");
                batch.push(upload, category);
                if batch.violates_single_media_rule() && !mixed_reported {
                    problems.push(BatchProblem::MixedMedia);
                    mixed_reported = true;
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(batch)
    } else {
        Err(BatchError::new(problems))
    }
}

/// Sniffed MIME type, or the category's default when sniffing fails.
fn media_type_of(item: &ClassifiedUpload) -> &'static str {
    let fallback = match item.category {
        MediaCategory::Video => "video/mp4",
        MediaCategory::AnimatedImage => "image/gif",
        MediaCategory::Image => "image/jpeg",
    };
    match sniff_file(item.upload.path()) {
        Ok(roost_processing::sniff::OCTET_STREAM) | Err(_) => fallback,
        Ok(mime) => mime,
    }
}
