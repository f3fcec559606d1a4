//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Every failure renders
//! as the proxy's error envelope: `{"code": 10, "error": {"message": ...}}`.

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roost_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

use crate::constants::CODE_ERROR;

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub kind: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u8,
    pub error: ErrorDetail,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and AppError live in other crates)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl HttpAppError {
    /// Failure reported by an orchestrator operation, one message per line.
    pub fn upstream(errors: &[String]) -> Self {
        HttpAppError(AppError::Upstream(errors.join("\n")))
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<FormRejection> for HttpAppError {
    fn from(rejection: FormRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid form body: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::BadRequest(rejection.body_text()))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Error chains are only exposed outside production, and never for sensitive errors
        let details = if is_production_env() || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = ErrorBody {
            code: CODE_ERROR,
            error: ErrorDetail {
                message: app_error.client_message(),
                kind: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_errors_joined_with_newlines() {
        let errors = vec![
            "[0] file size is too large".to_string(),
            "Image size must be <= 5242880 bytes".to_string(),
        ];
        let response = HttpAppError::upstream(&errors).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["code"], 10);
        assert_eq!(
            body["error"]["message"],
            "[0] file size is too large\nImage size must be <= 5242880 bytes"
        );
        assert_eq!(body["error"]["kind"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response =
            HttpAppError::from(anyhow::anyhow!("token file missing")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let response =
            HttpAppError(AppError::InvalidInput("status is required".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "status is required");
    }
}
