//! Cached read routes

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::HttpAppError;
use crate::response::{read_response, SuccessBody};
use crate::state::AppState;

type ReadReply = Result<Json<SuccessBody<Value>>, HttpAppError>;

#[tracing::instrument(skip(state))]
pub async fn user_timeline(State(state): State<Arc<AppState>>) -> ReadReply {
    read_response(state.proxy.fetch_user_timeline(false).await, "user timeline")
}

#[tracing::instrument(skip(state))]
pub async fn mentions_timeline(State(state): State<Arc<AppState>>) -> ReadReply {
    read_response(state.proxy.fetch_mentions(false).await, "mentions timeline")
}

/// Search with the configured hashtag query.
#[tracing::instrument(skip(state))]
pub async fn hash(State(state): State<Arc<AppState>>) -> ReadReply {
    read_response(state.proxy.search_default(false).await, "search result")
}
