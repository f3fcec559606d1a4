//! Success envelope and the mapping from [`OperationResult`] to a response.

use axum::Json;
use roost_core::OperationResult;
use serde::Serialize;

use crate::constants::CODE_OK;
use crate::error::HttpAppError;

#[derive(Debug, Serialize)]
pub struct SuccessBody<T> {
    pub code: u8,
    pub data: T,
}

impl<T> SuccessBody<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            code: CODE_OK,
            data,
        })
    }
}

/// Read results must carry data; a result with neither errors nor data answers
/// `Failed to get <what> with Twitter API.`
pub fn read_response<T: Serialize>(
    result: OperationResult<T>,
    what: &str,
) -> Result<Json<SuccessBody<T>>, HttpAppError> {
    if result.has_errors() {
        return Err(HttpAppError::upstream(&result.errors));
    }
    match result.data {
        Some(data) => Ok(SuccessBody::new(data)),
        None => Err(HttpAppError::upstream(&[format!(
            "Failed to get {what} with Twitter API."
        )])),
    }
}

/// Write results may legitimately carry no data (an empty post is a no-op).
pub fn write_response<T: Serialize>(
    result: OperationResult<T>,
) -> Result<Json<SuccessBody<Option<T>>>, HttpAppError> {
    if result.has_errors() {
        return Err(HttpAppError::upstream(&result.errors));
    }
    Ok(SuccessBody::new(result.data))
}
