use std::path::Path;

use roost_core::{MediaCategory, MediaLimits, UploadBatch, ValidationError};

/// Per-category file size validator.
///
/// Validation is purely local and runs before any upload is attempted.
#[derive(Debug, Clone, Copy)]
pub struct SizeValidator {
    limits: MediaLimits,
}

impl SizeValidator {
    pub fn new(limits: MediaLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &MediaLimits {
        &self.limits
    }

    /// Check one file against the maximum for its category.
    pub fn validate(
        &self,
        path: &Path,
        category: MediaCategory,
        declared_filename: &str,
    ) -> Result<(), ValidationError> {
        let max = self.limits.max_for(category);
        let size = std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| {
                tracing::warn!(error = %e, filename = declared_filename, "Upload is not readable");
                ValidationError::single(declared_filename, format!("{} could not be read", declared_filename))
            })?;

        if size > max {
            tracing::debug!(
                filename = declared_filename,
                category = %category,
                size,
                max,
                "File exceeds size limit"
            );
            return Err(ValidationError::single(
                declared_filename,
                format!("{} size must be <= {} bytes", category.label(), max),
            ));
        }

        Ok(())
    }

    /// Validate every file of a batch, collecting all failures in order.
    pub fn validate_batch(&self, batch: &UploadBatch) -> Result<(), ValidationError> {
        let failures = batch
            .iter()
            .filter_map(|item| {
                self.validate(item.upload.path(), item.category, item.upload.client_filename())
                    .err()
            })
            .collect::<Vec<_>>();

        match ValidationError::merge(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::{IntoErrorMessages, MediaUpload};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn limits() -> MediaLimits {
        MediaLimits {
            image: 10,
            animated_image: 20,
            video: 30,
        }
    }

    fn file_of(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; len]).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_within_limit() {
        let validator = SizeValidator::new(limits());
        let file = file_of(10);
        assert!(validator
            .validate(file.path(), MediaCategory::Image, "a.png")
            .is_ok());
    }

    #[test]
    fn test_exceeds_limit_message() {
        let validator = SizeValidator::new(limits());
        let file = file_of(21);
        let err = validator
            .validate(file.path(), MediaCategory::AnimatedImage, "anim.gif")
            .unwrap_err();
        assert_eq!(err.entries()[0].filename, "anim.gif");
        assert_eq!(
            err.into_error_messages(),
            vec!["Animation GIF size must be <= 20 bytes"]
        );
    }

    #[test]
    fn test_limit_depends_on_category() {
        let validator = SizeValidator::new(limits());
        let file = file_of(25);
        assert!(validator.validate(file.path(), MediaCategory::Video, "v.mp4").is_ok());
        assert!(validator.validate(file.path(), MediaCategory::Image, "v.png").is_err());
    }

    #[test]
    fn test_batch_collects_every_failure() {
        let validator = SizeValidator::new(limits());
        let mut batch = UploadBatch::new();
        for (name, len) in [("a.png", 11), ("b.png", 5), ("c.png", 12)] {
            let file = file_of(len);
            batch.push(
                MediaUpload::new(file.into_temp_path(), name, None),
                MediaCategory::Image,
            );
        }

        let err = validator.validate_batch(&batch).unwrap_err();
        let names: Vec<_> = err.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
    }
}
