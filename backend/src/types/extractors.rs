//! Custom extractors for request validation

use axum::{
    body::{to_bytes, Body},
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::types::error::AppError;

/// Largest accepted request body, same as axum's default body limit
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON extractor that runs `validator` rules before the handler sees the payload
///
/// An empty body reads as `T::default()` and is validated like any other
/// payload. A non-empty body must be `application/json`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
            tracing::debug!("Failed to read request body: {err}");
            AppError::new(
                StatusCode::BAD_REQUEST,
                "invalid_json",
                "invalid json",
                false,
            )
        })?;

        let payload = if bytes.is_empty() {
            T::default()
        } else {
            Self::parse(Request::from_parts(parts, Body::from(bytes)), state).await?
        };

        payload.validate().map_err(|errors| {
            // Field order is stable so the reported code does not flap
            let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
            field_errors.sort_by(|(a, _), (b, _)| a.cmp(b));

            // The first field error's message (or code) carries our error code
            field_errors
                .iter()
                .find_map(|(_, field)| field.first())
                .map(|error| error.message.as_deref().unwrap_or(&error.code))
                .map_or_else(
                    || AppError::validation("validation_error"),
                    AppError::validation,
                )
        })?;

        Ok(Self(payload))
    }
}

impl<T> ValidatedJson<T>
where
    T: serde::de::DeserializeOwned,
{
    async fn parse<S: Send + Sync>(req: Request, state: &S) -> Result<T, AppError> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| {
                tracing::debug!("Rejected JSON body: {err}");
                match err {
                    JsonRejection::MissingJsonContentType(_) => AppError::new(
                        StatusCode::BAD_REQUEST,
                        "invalid_content_type_header",
                        "Missing Content-Type: application/json header",
                        false,
                    ),
                    _ => AppError::new(
                        StatusCode::BAD_REQUEST,
                        "invalid_json",
                        "invalid json",
                        false,
                    ),
                }
            })?;

        Ok(payload)
    }
}
