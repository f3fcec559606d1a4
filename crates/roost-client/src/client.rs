//! `reqwest` implementation of [`RemoteApi`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use roost_core::{MediaCategory, MediaId, RemoteCallError, RemoteConfig};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::RemoteApi;
use crate::oauth::OAuthSigner;

/// Twitter v1.1 REST client.
pub struct TwitterClient {
    pub(crate) client: Client,
    api_url: String,
    pub(crate) upload_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteCallError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("roost/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteCallError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            upload_url: config.upload_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(config.credentials.clone()),
        })
    }

    /// `{base}/{endpoint}.json`
    pub(crate) fn endpoint_url(base: &str, endpoint: &str) -> String {
        format!("{}/{}.json", base, endpoint.trim_matches('/'))
    }

    pub(crate) fn signed(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<RequestBuilder, RemoteCallError> {
        let header = self.signer.sign(method, url, params)?;
        Ok(request.header(reqwest::header::AUTHORIZATION, header))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Value, RemoteCallError> {
        let response = request.send().await.map_err(transport_error)?;
        handle_response(response).await
    }

    pub(crate) async fn get_from(
        &self,
        base: &str,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, RemoteCallError> {
        let url = Self::endpoint_url(base, endpoint);
        let request = self.client.get(&url).query(params);
        let request = self.signed(request, "GET", &url, params)?;
        self.send(request).await
    }

    pub(crate) async fn post_to(
        &self,
        base: &str,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, RemoteCallError> {
        let url = Self::endpoint_url(base, endpoint);
        let request = self.client.post(&url).form(params);
        let request = self.signed(request, "POST", &url, params)?;
        self.send(request).await
    }
}

#[async_trait]
impl RemoteApi for TwitterClient {
    #[instrument(skip(self, params))]
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError> {
        debug!(endpoint, "GET");
        self.get_from(&self.api_url, endpoint, params).await
    }

    #[instrument(skip(self, params))]
    async fn post(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, RemoteCallError> {
        debug!(endpoint, "POST");
        self.post_to(&self.api_url, endpoint, params).await
    }

    #[instrument(skip(self, path, content_type))]
    async fn upload_media(
        &self,
        path: &Path,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<MediaId, RemoteCallError> {
        self.upload_simple(path, filename, content_type).await
    }

    #[instrument(skip(self, path))]
    async fn upload_chunked(
        &self,
        path: &Path,
        media_type: &str,
        category: MediaCategory,
    ) -> Result<MediaId, RemoteCallError> {
        self.upload_in_chunks(path, media_type, category).await
    }
}

fn transport_error(err: reqwest::Error) -> RemoteCallError {
    if err.is_timeout() {
        RemoteCallError::Transport("Request to Twitter API timed out".to_string())
    } else {
        RemoteCallError::Transport(format!("Request to Twitter API failed: {err}"))
    }
}

/// Map a response to its JSON body or an API error.
pub(crate) async fn handle_response(response: Response) -> Result<Value, RemoteCallError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_slice(&bytes).map_err(|e| RemoteCallError::Decode(e.to_string()));
    }

    let message = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|body| api_error_message(&body))
        .unwrap_or_else(|| format!("Twitter API returned status {}", status.as_u16()));

    warn!(status = status.as_u16(), message = %message, "Twitter API error");
    Err(RemoteCallError::Api {
        status: status.as_u16(),
        message,
    })
}

/// First message of a v1.1 `{"errors": [{"code", "message"}]}` body, or `{"error": "..."}`.
fn api_error_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .pointer("/errors/0/message")
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }
    body.get("error").and_then(Value::as_str).map(str::to_string)
}
