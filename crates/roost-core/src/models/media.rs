use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::TempPath;

/// Media category derived from file content, never from the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Image,
    AnimatedImage,
    Video,
}

impl MediaCategory {
    /// Human readable label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            MediaCategory::Image => "Image",
            MediaCategory::AnimatedImage => "Animation GIF",
            MediaCategory::Video => "Video",
        }
    }

    pub fn is_video_or_animation(&self) -> bool {
        matches!(self, MediaCategory::Video | MediaCategory::AnimatedImage)
    }

    /// `media_category` value sent with a chunked upload INIT command.
    pub fn upload_category(&self) -> &'static str {
        match self {
            MediaCategory::Image => "tweet_image",
            MediaCategory::AnimatedImage => "tweet_gif",
            MediaCategory::Video => "tweet_video",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A file received from the client, spooled to a temp file.
///
/// The temp file is removed when the upload is dropped.
#[derive(Debug)]
pub struct MediaUpload {
    temp: TempPath,
    client_filename: String,
    content_type: Option<String>,
}

impl MediaUpload {
    pub fn new(temp: TempPath, client_filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            temp,
            client_filename: client_filename.into(),
            content_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn client_filename(&self) -> &str {
        &self.client_filename
    }

    /// Content type declared by the client. Informational only.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Which size limit rejected a file part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBoundary {
    /// Whole request body limit of the server
    Server,
    /// Per-file limit of the form
    Form,
}

/// Outcome of receiving one file slot of a multipart submission.
#[derive(Debug)]
pub enum SubmittedFile {
    Uploaded(MediaUpload),
    /// The slot was present but no file was selected.
    NoFile,
    SizeExceeded(SizeBoundary),
    /// Any other receive failure.
    Failed,
    /// The slot could not be interpreted as a single file.
    Malformed,
}

#[derive(Debug)]
pub struct ClassifiedUpload {
    pub upload: MediaUpload,
    pub category: MediaCategory,
}

/// Ordered set of accepted files for one post.
#[derive(Debug, Default)]
pub struct UploadBatch {
    items: Vec<ClassifiedUpload>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, upload: MediaUpload, category: MediaCategory) {
        self.items.push(ClassifiedUpload { upload, category });
    }

    pub fn contains_video_or_animation(&self) -> bool {
        self.items.iter().any(|item| item.category.is_video_or_animation())
    }

    /// A batch with a video or animation may only hold that single file.
    pub fn violates_single_media_rule(&self) -> bool {
        self.contains_video_or_animation() && self.items.len() > 1
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassifiedUpload> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<ClassifiedUpload> {
        self.items
    }
}
