//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metadata_storage::image::ImageStorageError;
use serde::Serialize;

use crate::presigner::PresignError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client may retry the request unchanged
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// Create a `400 BAD_REQUEST` error from a validation error code
    #[must_use]
    pub fn validation(code: &str) -> Self {
        match code {
            "invalid_content_type" => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_content_type",
                "contentType must be image/*",
                false,
            ),
            "key_and_url_required" => Self::new(
                StatusCode::BAD_REQUEST,
                "key_and_url_required",
                "key and url are required",
                false,
            ),
            _ => Self::new(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed",
                false,
            ),
        }
    }

    /// Create a generic `500 INTERNAL_SERVER_ERROR`
    #[must_use]
    pub const fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            true,
        )
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Client errors are expected traffic, only server errors are failures
        match self.status.as_u16() {
            400..=499 => tracing::debug!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert presigning errors to application errors
impl From<PresignError> for AppError {
    fn from(err: PresignError) -> Self {
        match &err {
            PresignError::InvalidInput(msg) => {
                tracing::debug!("Invalid presign input: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_input",
                    "Invalid input provided",
                    false,
                )
            }
            PresignError::S3Error(msg) | PresignError::ConfigError(msg) => {
                tracing::error!("Presign error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "presign_error",
                    "Internal server error",
                    true,
                )
            }
        }
    }
}

/// Convert metadata storage errors to application errors
impl From<ImageStorageError> for AppError {
    fn from(err: ImageStorageError) -> Self {
        tracing::error!("Image metadata storage error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "db_insert_error",
            "Internal server error",
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_codes() {
        let err = AppError::validation("invalid_content_type");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_content_type");

        let err = AppError::validation("key_and_url_required");
        assert_eq!(err.code(), "key_and_url_required");

        let err = AppError::validation("something_else");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_presign_errors_hide_details() {
        let err = AppError::from(PresignError::S3Error("no credentials".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "presign_error");
        assert_eq!(err.inner.error.message, "Internal server error");

        let err = AppError::from(PresignError::ConfigError("expiry".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(PresignError::InvalidInput("empty key".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let err = AppError::from(ImageStorageError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "db_insert_error");
        assert!(err.inner.allow_retry);
    }
}
