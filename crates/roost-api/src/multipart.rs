//! Multipart form extraction
//!
//! File parts are spooled to temporary files while they stream in, so a large
//! video never sits in memory. Each file part becomes one [`SubmittedFile`] slot
//! in submission order; problems are recorded on the slot rather than failing the
//! whole request, so the orchestrator can report every one of them.

use std::io::Write;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use roost_core::{AppError, MediaUpload, SizeBoundary, SubmittedFile};
use tempfile::NamedTempFile;

use crate::constants::{FIELD_MEDIA, FIELD_STATUS};
use crate::error::HttpAppError;

/// Text and file slots read from an upload form.
#[derive(Debug, Default)]
pub struct MediaForm {
    pub status: String,
    pub files: Vec<SubmittedFile>,
}

fn is_media_field(name: &str) -> bool {
    name == FIELD_MEDIA || name.strip_suffix("[]") == Some(FIELD_MEDIA)
}

/// Slot recorded when the body stream itself fails.
fn slot_for_stream_error(err: &MultipartError) -> SubmittedFile {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SubmittedFile::SizeExceeded(SizeBoundary::Server)
    } else {
        tracing::warn!(error = %err, "Multipart stream failed");
        SubmittedFile::Failed
    }
}

/// Read the whole form. `max_file_bytes` is the per-file form limit.
pub async fn read_media_form(
    mut multipart: Multipart,
    max_file_bytes: u64,
) -> Result<MediaForm, HttpAppError> {
    let mut form = MediaForm::default();

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                // The stream cannot be resumed after an error
                form.files.push(slot_for_stream_error(&e));
                break;
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == FIELD_STATUS {
            form.status = field.text().await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::PayloadTooLarge(e.body_text())
                } else {
                    AppError::BadRequest(format!("Failed to read status: {}", e.body_text()))
                }
            })?;
            continue;
        }

        if !is_media_field(&name) {
            tracing::debug!(field = %name, "Ignoring unknown form field");
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            // A plain value where a file was expected
            form.files.push(SubmittedFile::Malformed);
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        match spool_field(&mut field, filename, content_type, max_file_bytes).await {
            Ok(slot) => form.files.push(slot),
            Err(e) => {
                form.files.push(slot_for_stream_error(&e));
                break;
            }
        }
    }

    Ok(form)
}

/// Stream one file part to disk. `Err` means the body stream broke.
async fn spool_field(
    field: &mut Field<'_>,
    filename: String,
    content_type: Option<String>,
    max_file_bytes: u64,
) -> Result<SubmittedFile, MultipartError> {
    let mut temp = match NamedTempFile::new() {
        Ok(temp) => temp,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create temp file for upload");
            return Ok(SubmittedFile::Failed);
        }
    };

    let mut written: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        written += chunk.len() as u64;
        if written > max_file_bytes {
            tracing::debug!(filename = %filename, limit = max_file_bytes, "Form file limit exceeded");
            return Ok(SubmittedFile::SizeExceeded(SizeBoundary::Form));
        }
        if let Err(e) = temp.write_all(&chunk) {
            tracing::warn!(error = %e, filename = %filename, "Failed to spool upload");
            return Ok(SubmittedFile::Failed);
        }
    }

    if written == 0 && filename.is_empty() {
        return Ok(SubmittedFile::NoFile);
    }

    if let Err(e) = temp.flush() {
        tracing::warn!(error = %e, filename = %filename, "Failed to flush upload");
        return Ok(SubmittedFile::Failed);
    }

    Ok(SubmittedFile::Uploaded(MediaUpload::new(
        temp.into_temp_path(),
        filename,
        content_type,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_field_names() {
        assert!(is_media_field("media"));
        assert!(is_media_field("media[]"));
        assert!(!is_media_field("status"));
        assert!(!is_media_field("media[0]"));
    }
}
