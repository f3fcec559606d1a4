//! Magic-byte MIME detection.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from the head of a file for sniffing.
const SNIFF_LEN: usize = 32;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect a MIME type from the leading bytes of a file.
pub fn sniff_mime(data: &[u8]) -> &'static str {
    if data.len() < 4 {
        return OCTET_STREAM;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }

    // PNG: 89 50 4E 47
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png";
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return "image/gif";
    }

    // WebP: RIFF ... WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    if data.starts_with(b"BM") {
        return "image/bmp";
    }

    if data.len() >= 8 {
        if let Some(mime) = sniff_iso_media(data) {
            return mime;
        }
    }

    OCTET_STREAM
}

/// ISO base media (MP4 / QuickTime) detection from the first box.
fn sniff_iso_media(data: &[u8]) -> Option<&'static str> {
    let box_type = &data[4..8];

    if box_type == b"ftyp" {
        if data.len() < 12 {
            return Some("video/mp4");
        }
        let brand = &data[8..12];
        return Some(match brand {
            b"qt  " => "video/quicktime",
            b"M4A " | b"M4B " | b"M4P " => "audio/mp4",
            _ if brand.starts_with(b"M4V") => "video/x-m4v",
            _ if brand.starts_with(b"3g") => "video/3gpp",
            _ => "video/mp4",
        });
    }

    // Legacy QuickTime files may open with a bare atom
    match box_type {
        b"moov" | b"mdat" | b"wide" | b"free" | b"skip" | b"pnot" => Some("video/quicktime"),
        _ => None,
    }
}

/// Read the head of a file and sniff it.
pub fn sniff_file(path: &Path) -> io::Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(sniff_mime(&head))
}
