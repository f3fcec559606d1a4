use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use roost_core::SubmittedFile;
use serde_json::{json, Value};

use crate::constants::MSG_UPLOAD_FAILED;
use crate::error::HttpAppError;
use crate::multipart::read_media_form;
use crate::response::{write_response, SuccessBody};
use crate::state::AppState;

/// Upload the first submitted file without publishing; answers with its media id.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessBody<Option<Value>>>, HttpAppError> {
    let form = read_media_form(multipart?, state.config.max_form_file_bytes()).await?;

    let upload = match form.files.into_iter().next() {
        Some(SubmittedFile::Uploaded(upload)) => upload,
        other => {
            tracing::debug!(slot = ?other, "No usable file in upload form");
            return Err(HttpAppError::upstream(&[MSG_UPLOAD_FAILED.to_string()]));
        }
    };

    let result = state
        .proxy
        .upload_single_media(upload)
        .await
        .map(|media_id| json!({ "media_id_string": media_id }));
    write_response(result)
}
