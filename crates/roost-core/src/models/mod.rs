pub mod media;
pub mod tweet;

pub use media::{ClassifiedUpload, MediaCategory, MediaUpload, SizeBoundary, SubmittedFile, UploadBatch};
pub use tweet::{Information, MediaId, TweetReference};
