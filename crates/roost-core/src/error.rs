//! Error types module
//!
//! `AppError` is the boundary-level error handed to the HTTP layer and describes
//! itself through `ErrorMetadata`. The domain errors below it (`ValidationError`,
//! `RemoteCallError`, `BatchError`) never cross the orchestrator boundary: they are
//! turned into the `errors` list of an `OperationResult`.

use std::io;

use crate::constants::MSG_MIXED_MEDIA;
use crate::result::IntoErrorMessages;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like upstream outages
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPSTREAM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// The remote API (or an operation depending on it) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::Upstream(_) => (503, "UPSTREAM_ERROR", true, false, LogLevel::Warn),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Upstream(_) => "Upstream",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg)
            | AppError::BadRequest(ref msg)
            | AppError::PayloadTooLarge(ref msg)
            | AppError::Upstream(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

/// One offending file of a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    pub filename: String,
    pub message: String,
}

/// Local, pre-network validation failure. Entries keep submission order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", render_fields(.entries))]
pub struct ValidationError {
    entries: Vec<FieldMessage>,
}

fn render_fields(entries: &[FieldMessage]) -> String {
    entries
        .iter()
        .map(|e| format!("{}=\"{}\"", e.filename, e.message))
        .collect::<Vec<_>>()
        .join(";")
}

impl ValidationError {
    pub fn single(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entries: vec![FieldMessage {
                filename: filename.into(),
                message: message.into(),
            }],
        }
    }

    /// Merge several failures, keeping their order. Returns `None` for an empty input.
    pub fn merge(errors: impl IntoIterator<Item = ValidationError>) -> Option<Self> {
        let entries: Vec<FieldMessage> = errors.into_iter().flat_map(|e| e.entries).collect();
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn entries(&self) -> &[FieldMessage] {
        &self.entries
    }
}

impl IntoErrorMessages for ValidationError {
    fn into_error_messages(self) -> Vec<String> {
        self.entries.into_iter().map(|e| e.message).collect()
    }
}

/// Failure reported by the remote API client.
///
/// Callers only ever use the `Display` text; the variants exist for logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteCallError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Media processing failed: {0}")]
    Processing(String),
}

impl IntoErrorMessages for RemoteCallError {
    fn into_error_messages(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

/// One problem found while assembling an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchProblem {
    #[error("[{index}] file size is too large")]
    SizeExceeded { index: usize },

    #[error("[{index}] an unexpected upload error occurred")]
    Failed { index: usize },

    #[error("[{index}] invalid parameter")]
    Malformed { index: usize },

    #[error("{}", MSG_MIXED_MEDIA)]
    MixedMedia,
}

/// Batch-level failures detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_problems(.problems))]
pub struct BatchError {
    problems: Vec<BatchProblem>,
}

fn render_problems(problems: &[BatchProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BatchError {
    pub fn new(problems: Vec<BatchProblem>) -> Self {
        Self { problems }
    }

    pub fn problems(&self) -> &[BatchProblem] {
        &self.problems
    }
}

impl IntoErrorMessages for BatchError {
    fn into_error_messages(self) -> Vec<String> {
        self.problems.iter().map(ToString::to_string).collect()
    }
}

/// Any failure of an orchestrated operation.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Remote(#[from] RemoteCallError),
}

impl IntoErrorMessages for OperationError {
    fn into_error_messages(self) -> Vec<String> {
        match self {
            OperationError::Validation(err) => err.into_error_messages(),
            OperationError::Batch(err) => err.into_error_messages(),
            OperationError::Remote(err) => err.into_error_messages(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_upstream() {
        let err = AppError::Upstream("Rate limit exceeded".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Rate limit exceeded");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_client_error_statuses() {
        let cases = [
            (AppError::InvalidInput("x".into()), 400, "INVALID_INPUT"),
            (AppError::BadRequest("x".into()), 400, "BAD_REQUEST"),
            (AppError::PayloadTooLarge("x".into()), 413, "PAYLOAD_TOO_LARGE"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.http_status_code(), status);
            assert_eq!(err.error_code(), code);
            assert!(!err.is_recoverable());
        }
    }

    #[test]
    fn test_error_metadata_internal_hides_details() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_sensitive());
        assert_eq!(err.error_type(), "Internal");
    }

    #[test]
    fn test_validation_messages_keep_order() {
        let merged = ValidationError::merge(vec![
            ValidationError::single("b.png", "Image size must be <= 10 bytes"),
            ValidationError::single("a.mp4", "Video size must be <= 20 bytes"),
        ])
        .unwrap();

        assert_eq!(merged.entries()[0].filename, "b.png");
        assert_eq!(
            merged.to_string(),
            "validation failed: b.png=\"Image size must be <= 10 bytes\";a.mp4=\"Video size must be <= 20 bytes\""
        );
        assert_eq!(
            merged.into_error_messages(),
            vec![
                "Image size must be <= 10 bytes".to_string(),
                "Video size must be <= 20 bytes".to_string()
            ]
        );
        assert!(ValidationError::merge(Vec::new()).is_none());
    }

    #[test]
    fn test_batch_problem_messages() {
        let err = BatchError::new(vec![
            BatchProblem::SizeExceeded { index: 0 },
            BatchProblem::Failed { index: 2 },
            BatchProblem::Malformed { index: 3 },
            BatchProblem::MixedMedia,
        ]);
        assert_eq!(
            err.into_error_messages(),
            vec![
                "[0] file size is too large",
                "[2] an unexpected upload error occurred",
                "[3] invalid parameter",
                MSG_MIXED_MEDIA,
            ]
        );
    }

    #[test]
    fn test_remote_error_message_only() {
        let err = OperationError::from(RemoteCallError::Api {
            status: 403,
            message: "Status is a duplicate.".to_string(),
        });
        assert_eq!(err.into_error_messages(), vec!["Status is a duplicate."]);
    }
}
