/// Prefix every proxy route is nested under.
pub const API_PREFIX: &str = "/api/twitter";

/// Envelope code for a successful response.
pub const CODE_OK: u8 = 0;
/// Envelope code for any failed response.
pub const CODE_ERROR: u8 = 10;

pub const MSG_UPLOAD_FAILED: &str = "Failed to post upload with Twitter API.";

/// Multipart field carrying the tweet text.
pub const FIELD_STATUS: &str = "status";
/// Multipart field(s) carrying media files. `media[]` is accepted as well.
pub const FIELD_MEDIA: &str = "media";
