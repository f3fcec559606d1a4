//! Content-based media classification.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use roost_core::constants::VIDEO_MIME_TYPES;
use roost_core::MediaCategory;

use crate::sniff::sniff_file;

/// Classify a file by its bytes. The filename and declared type are never consulted.
///
/// Unreadable or corrupt files fall through to [`MediaCategory::Image`].
pub fn classify(path: &Path) -> MediaCategory {
    let mime = match sniff_file(path) {
        Ok(mime) => mime,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Could not read upload for sniffing, treating as image");
            return MediaCategory::Image;
        }
    };

    if VIDEO_MIME_TYPES.contains(&mime) {
        return MediaCategory::Video;
    }

    if mime == "image/gif" && gif_frame_count(path).unwrap_or(0) > 1 {
        return MediaCategory::AnimatedImage;
    }

    MediaCategory::Image
}

/// Count GIF frames, stopping once a second frame is seen.
///
/// Returns `None` when the file cannot be opened or is not a decodable GIF.
pub fn gif_frame_count(path: &Path) -> Option<usize> {
    let file = File::open(path).ok()?;
    let decoder = match GifDecoder::new(BufReader::new(file)) {
        Ok(decoder) => decoder,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "GIF header could not be decoded");
            return None;
        }
    };

    let frames = decoder
        .into_frames()
        .take(2)
        .take_while(|frame| frame.is_ok())
        .count();
    Some(frames)
}
