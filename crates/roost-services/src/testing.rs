//! Scripted [`RemoteApi`] double for orchestrator and HTTP tests.
//!
//! Responses are keyed by endpoint (or by client filename for uploads) and are
//! replayed on every matching call. Every call is recorded.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use roost_client::{Params, RemoteApi};
use roost_core::{MediaCategory, MediaId, RemoteCallError};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Get,
    Post,
    Upload,
    UploadChunked,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub endpoint: String,
    pub params: Params,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Scripted<T> = Result<T, RemoteCallError>;

#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct MockRemote {
    gets: HashMap<String, Scripted<Value>>,
    posts: HashMap<String, Scripted<Value>>,
    uploads: HashMap<String, (Duration, Scripted<MediaId>)>,
    chunked: Option<Scripted<MediaId>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, endpoint: &str, response: Scripted<Value>) -> Self {
        self.gets.insert(endpoint.to_string(), response);
        self
    }

    pub fn on_post(mut self, endpoint: &str, response: Scripted<Value>) -> Self {
        self.posts.insert(endpoint.to_string(), response);
        self
    }

    /// Script the simple upload of the file submitted as `filename`.
    pub fn on_upload(self, filename: &str, response: Scripted<MediaId>) -> Self {
        self.on_delayed_upload(filename, Duration::ZERO, response)
    }

    pub fn on_delayed_upload(
        mut self,
        filename: &str,
        delay: Duration,
        response: Scripted<MediaId>,
    ) -> Self {
        self.uploads
            .insert(filename.to_string(), (delay, response));
        self
    }

    pub fn on_chunked_upload(mut self, response: Scripted<MediaId>) -> Self {
        self.chunked = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.kind == kind).collect()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| c.endpoint == endpoint).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, kind: CallKind, endpoint: &str, params: Params) {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            endpoint: endpoint.to_string(),
            params,
        });
    }
}

fn unscripted<T>(what: &str) -> Scripted<T> {
    Err(RemoteCallError::Api {
        status: 404,
        message: format!("no scripted response for {what}"),
    })
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError> {
        self.record(CallKind::Get, endpoint, params.to_vec());
        self.gets
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| unscripted(endpoint))
    }

    async fn post(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError> {
        self.record(CallKind::Post, endpoint, params.to_vec());
        self.posts
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| unscripted(endpoint))
    }

    async fn upload_media(
        &self,
        _path: &Path,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<MediaId, RemoteCallError> {
        let mut params = vec![("filename".to_string(), filename.to_string())];
        if let Some(content_type) = content_type {
            params.push(("content_type".to_string(), content_type.to_string()));
        }
        self.record(CallKind::Upload, "media/upload", params);

        match self.uploads.get(filename) {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                response.clone()
            }
            None => unscripted(filename),
        }
    }

    async fn upload_chunked(
        &self,
        _path: &Path,
        media_type: &str,
        category: MediaCategory,
    ) -> Result<MediaId, RemoteCallError> {
        self.record(
            CallKind::UploadChunked,
            "media/upload",
            vec![
                ("media_type".to_string(), media_type.to_string()),
                ("media_category".to_string(), category.upload_category().to_string()),
            ],
        );
        self.chunked
            .clone()
            .unwrap_or_else(|| unscripted("chunked upload"))
    }
}

/// Minimal status object as returned by `statuses/update` and `statuses/destroy`.
pub fn status_json(screen_name: &str, id: &str) -> Value {
    json!({
        "id_str": id,
        "text": "status",
        "user": { "screen_name": screen_name }
    })
}
