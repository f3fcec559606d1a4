//! Request body extractors

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::HttpAppError;

/// Accepts either a JSON body or an urlencoded form, chosen by `Content-Type`.
/// Rejections render through [`HttpAppError`] like every other failure.
#[derive(Debug, Clone, Copy)]
pub struct JsonOrForm<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(inner) = Json::<T>::from_request(req, state).await?;
            Ok(JsonOrForm(inner))
        } else {
            let Form(inner) = Form::<T>::from_request(req, state).await?;
            Ok(JsonOrForm(inner))
        }
    }
}
