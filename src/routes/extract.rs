//! Request body extractors that report failures as `AppError`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

const INVALID_BODY_MESSAGE: &str = "The request body is invalid.";
const INVALID_BODY_ACTION: &str = "Send a JSON body with the expected fields and types.";
const CONTENT_TYPE_MESSAGE: &str = "The request body must be JSON.";
const CONTENT_TYPE_ACTION: &str = "Set the 'Content-Type: application/json' header.";

fn invalid_body(rejection: JsonRejection) -> AppError {
    warn!(reason = %rejection.body_text(), "rejected request body");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation(CONTENT_TYPE_MESSAGE, CONTENT_TYPE_ACTION)
        }
        _ => AppError::validation(INVALID_BODY_MESSAGE, INVALID_BODY_ACTION),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Required JSON body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(Self(value))
    }
}

/// JSON body where an empty request body means `T::default()`. Anything
/// non-empty must be well-formed JSON sent as JSON.
pub struct PatchBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for PatchBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            warn!(reason = %e.body_text(), "unreadable request body");
            AppError::validation(INVALID_BODY_MESSAGE, INVALID_BODY_ACTION)
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        if !json {
            warn!("non-empty body without a JSON content type");
            return Err(AppError::validation(CONTENT_TYPE_MESSAGE, CONTENT_TYPE_ACTION));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(invalid_body)?;
        Ok(Self(value))
    }
}
