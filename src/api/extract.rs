//! Lenient JSON body extractor.
//!
//! Bodies without a JSON content type, or with no bytes at all, are treated as
//! an empty object so every field falls back to its default. A JSON array is
//! treated the same way. Malformed JSON and bare primitives are rejected.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::handlers::ErrorResponse;

#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJson<T>(pub T);

fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[async_trait]
impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(LenientJson(T::default()));
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "rejected malformed JSON body");
            invalid_body()
        })?;

        match value {
            Value::Object(_) => serde_json::from_value(value).map(LenientJson).map_err(|e| {
                tracing::warn!(error = %e, "rejected JSON body");
                invalid_body()
            }),
            // Arrays carry no named fields.
            Value::Array(_) => Ok(LenientJson(T::default())),
            _ => {
                tracing::warn!("rejected non-object JSON body");
                Err(invalid_body())
            }
        }
    }
}

fn invalid_body() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Invalid JSON body",
        }),
    )
        .into_response()
}
