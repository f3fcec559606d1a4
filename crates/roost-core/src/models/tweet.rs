use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media identifier returned by the remote upload endpoint (`media_id_string`).
pub type MediaId = String;

/// Informational payload returned after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Information {
    pub text: String,
    pub url: String,
}

/// Minimal data needed to build a permalink for a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetReference {
    pub author_handle: String,
    pub status_id: String,
}

impl TweetReference {
    /// Extract `user.screen_name` and `id_str` from a status object.
    pub fn from_status(status: &Value) -> Option<Self> {
        let author_handle = status.pointer("/user/screen_name")?.as_str()?;
        let status_id = status.get("id_str")?.as_str()?;
        Some(Self {
            author_handle: author_handle.to_string(),
            status_id: status_id.to_string(),
        })
    }

    pub fn permalink(&self, base: &str) -> String {
        format!(
            "{}/{}/status/{}",
            base.trim_end_matches('/'),
            self.author_handle,
            self.status_id
        )
    }
}
