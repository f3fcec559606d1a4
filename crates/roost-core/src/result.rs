//! Uniform result envelope returned by every orchestrator operation.

use serde::Serialize;

/// Converts a failure into the ordered list of messages reported to the caller.
pub trait IntoErrorMessages {
    fn into_error_messages(self) -> Vec<String>;
}

/// `errors` and `data` are never both populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult<T> {
    pub errors: Vec<String>,
    pub data: Option<T>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            errors: Vec::new(),
            data: Some(data),
        }
    }

    /// Neither errors nor data, e.g. a post with no text and no files.
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            data: None,
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self { errors, data: None }
    }

    pub fn from_error<E: IntoErrorMessages>(err: E) -> Self {
        Self::failed(err.into_error_messages())
    }

    pub fn from_result<E: IntoErrorMessages>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            errors: self.errors,
            data: self.data.map(f),
        }
    }
}
