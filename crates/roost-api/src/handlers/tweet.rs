//! Write routes: publish, publish with media, delete

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use roost_core::{AppError, Information};
use roost_services::UpdateOptions;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::HttpAppError;
use crate::extract::JsonOrForm;
use crate::multipart::read_media_form;
use crate::response::{write_response, SuccessBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "media_ids")]
    pub media_ids: Vec<String>,
    pub in_reply_to_status_id: Option<String>,
    pub attachment_url: Option<String>,
}

/// `media_ids` arrives as a JSON array or, from forms, a comma-separated string.
fn media_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let ids = match Raw::deserialize(deserializer)? {
        Raw::List(ids) => ids,
        Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Publish with media ids uploaded earlier; answers with the refreshed timeline.
#[tracing::instrument(skip(state, request), fields(media = request.media_ids.len()))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    JsonOrForm(request): JsonOrForm<UpdateRequest>,
) -> Result<Json<SuccessBody<Option<Value>>>, HttpAppError> {
    let options = UpdateOptions {
        in_reply_to_status_id: non_empty(request.in_reply_to_status_id),
        attachment_url: non_empty(request.attachment_url),
    };
    let result = state
        .proxy
        .post_update(&request.status, &request.media_ids, &options)
        .await;
    write_response(result)
}

/// Publish `status` with the files submitted under `media`.
#[tracing::instrument(skip(state, multipart))]
pub async fn update_with_media(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessBody<Option<Information>>>, HttpAppError> {
    let form = read_media_form(multipart?, state.config.max_form_file_bytes()).await?;
    tracing::debug!(slots = form.files.len(), "Read upload form");

    let result = if form.files.is_empty() {
        state.proxy.post_text(&form.status).await
    } else {
        state.proxy.post_with_media(&form.status, form.files).await
    };
    write_response(result)
}

#[tracing::instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessBody<Option<Information>>>, HttpAppError> {
    if !is_status_id(&id) {
        return Err(AppError::InvalidInput(format!("Invalid status id: {id}")).into());
    }
    write_response(state.proxy.delete_tweet(&id).await)
}

/// Status ids are decimal. Anything else would be spliced into the endpoint path.
fn is_status_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}
