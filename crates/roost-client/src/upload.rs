//! Media upload: single-request `media/upload` and the chunked
//! INIT / APPEND / FINALIZE / STATUS sequence.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use roost_core::{MediaCategory, MediaId, RemoteCallError};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::client::TwitterClient;

/// APPEND segment size.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Upper bound on STATUS polls after FINALIZE.
const MAX_STATUS_POLLS: u32 = 60;

const UPLOAD_ENDPOINT: &str = "media/upload";

impl TwitterClient {
    pub(crate) async fn upload_simple(
        &self,
        path: &Path,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<MediaId, RemoteCallError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RemoteCallError::Transport(format!("Failed to read {filename}: {e}")))?;

        // An unparsable type is left off the part rather than failing the upload
        let content_type = content_type.filter(|ct| {
            let valid = Part::bytes(Vec::new()).mime_str(ct).is_ok();
            if !valid {
                warn!(content_type = %ct, "Ignoring invalid content type");
            }
            valid
        });

        let mut part = Part::bytes(bytes).file_name(filename.to_string());
        if let Some(content_type) = content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| RemoteCallError::Transport(format!("Invalid content type: {e}")))?;
        }

        let response = self.post_multipart(Form::new().part("media", part)).await?;
        media_id_of(&response)
    }

    pub(crate) async fn upload_in_chunks(
        &self,
        path: &Path,
        media_type: &str,
        category: MediaCategory,
    ) -> Result<MediaId, RemoteCallError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| RemoteCallError::Transport(format!("Failed to open upload: {e}")))?;
        let total_bytes = file
            .metadata()
            .await
            .map_err(|e| RemoteCallError::Transport(format!("Failed to stat upload: {e}")))?
            .len();

        let init = self
            .post_to(
                &self.upload_url,
                UPLOAD_ENDPOINT,
                &[
                    ("command".to_string(), "INIT".to_string()),
                    ("total_bytes".to_string(), total_bytes.to_string()),
                    ("media_type".to_string(), media_type.to_string()),
                    ("media_category".to_string(), category.upload_category().to_string()),
                ],
            )
            .await?;
        let media_id = media_id_of(&init)?;
        info!(media_id = %media_id, total_bytes, media_type, "Chunked upload initialised");

        let mut segment_index = 0u32;
        loop {
            let mut chunk = Vec::with_capacity(CHUNK_SIZE);
            (&mut file)
                .take(CHUNK_SIZE as u64)
                .read_to_end(&mut chunk)
                .await
                .map_err(|e| RemoteCallError::Transport(format!("Failed to read upload: {e}")))?;
            if chunk.is_empty() {
                break;
            }

            let form = Form::new()
                .text("command", "APPEND")
                .text("media_id", media_id.clone())
                .text("segment_index", segment_index.to_string())
                .part("media", Part::bytes(chunk));
            self.post_multipart(form).await?;
            debug!(media_id = %media_id, segment_index, "Segment appended");
            segment_index += 1;
        }

        let finalize = self
            .post_to(
                &self.upload_url,
                UPLOAD_ENDPOINT,
                &[
                    ("command".to_string(), "FINALIZE".to_string()),
                    ("media_id".to_string(), media_id.clone()),
                ],
            )
            .await?;

        self.wait_for_processing(&media_id, finalize).await?;
        Ok(media_id)
    }

    /// Poll STATUS until processing succeeds, fails or the poll budget runs out.
    /// Every response, including the last STATUS answer, is inspected.
    async fn wait_for_processing(
        &self,
        media_id: &str,
        mut response: Value,
    ) -> Result<(), RemoteCallError> {
        let mut polls = 0u32;
        loop {
            let Some(info) = response.get("processing_info") else {
                return Ok(());
            };

            match info.get("state").and_then(Value::as_str).unwrap_or("succeeded") {
                "pending" | "in_progress" => {
                    if polls >= MAX_STATUS_POLLS {
                        return Err(RemoteCallError::Processing(format!(
                            "media {media_id} was still processing after {MAX_STATUS_POLLS} checks"
                        )));
                    }
                    let wait = info
                        .get("check_after_secs")
                        .and_then(Value::as_u64)
                        .unwrap_or(1);
                    debug!(media_id, wait, polls, "Media still processing");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                "failed" => {
                    let message = info
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(RemoteCallError::Processing(message.to_string()));
                }
                _ => return Ok(()),
            }

            response = self
                .get_from(
                    &self.upload_url,
                    UPLOAD_ENDPOINT,
                    &[
                        ("command".to_string(), "STATUS".to_string()),
                        ("media_id".to_string(), media_id.to_string()),
                    ],
                )
                .await?;
            polls += 1;
        }
    }

    async fn post_multipart(&self, form: Form) -> Result<Value, RemoteCallError> {
        let url = Self::endpoint_url(&self.upload_url, UPLOAD_ENDPOINT);
        let request = self.client.post(&url).multipart(form);
        let request = self.signed(request, "POST", &url, &[])?;
        self.send(request).await
    }
}

fn media_id_of(response: &Value) -> Result<MediaId, RemoteCallError> {
    response
        .get("media_id_string")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RemoteCallError::Decode("response has no media_id_string".to_string()))
}
