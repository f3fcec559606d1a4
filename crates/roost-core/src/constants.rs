//! Shared constants and user-facing messages

/// Success text returned after a tweet is published.
pub const MSG_TWEET_POSTED: &str = "Tweet posted";

/// Success text returned after a tweet is deleted.
pub const MSG_TWEET_DELETED: &str = "Tweet deleted";

/// Batch policy violation: a video or animation must be posted alone.
pub const MSG_MIXED_MEDIA: &str = "cannot combine video/animation with other files in one post";

/// Default search query served by the hashtag route.
pub const DEFAULT_SEARCH_QUERY: &str = "#RTAinJapan exclude:retweets";

pub const DEFAULT_SEARCH_COUNT: u32 = 15;
pub const DEFAULT_TIMELINE_COUNT: u32 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

// Media size limits (bytes)
pub const MAX_IMAGE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_ANIMATED_GIF_SIZE_BYTES: u64 = 15 * 1024 * 1024;
pub const MAX_VIDEO_SIZE_BYTES: u64 = 512 * 1024 * 1024;

pub const MAX_REQUEST_BODY_BYTES: usize = 600 * 1024 * 1024;
pub const MAX_FORM_FILE_BYTES: u64 = 512 * 1024 * 1024;

/// Video MIME types accepted by the remote media endpoint.
pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/x-m4v"];
