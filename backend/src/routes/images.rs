use axum::{http::StatusCode, Extension, Json};
use metadata_storage::image::{NewUploadRecord, SharedImageRecordStore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use super::validation::validate_image_content_type;
use crate::types::{AppError, ValidatedJson};

/// Request to record an object the client has uploaded
///
/// Missing `key`/`url` read as empty and fail validation.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    /// Object storage key returned by the upload-url endpoint
    #[serde(default)]
    #[validate(length(min = 1, message = "key_and_url_required"))]
    pub key: String,

    /// Accessible URL of the uploaded object
    #[serde(default)]
    #[validate(length(min = 1, message = "key_and_url_required"))]
    pub url: String,

    /// MIME type of the object, must be `image/*`
    #[validate(custom(function = "validate_image_content_type"))]
    pub content_type: Option<String>,

    /// Object size in bytes
    pub size: Option<i64>,

    /// `ETag` returned by object storage for the PUT
    #[serde(rename = "eTag")]
    pub etag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveImageResponse {
    /// Identifier of the created record
    pub id: i64,
}

impl From<SaveImageRequest> for NewUploadRecord {
    fn from(request: SaveImageRequest) -> Self {
        Self {
            key: request.key,
            url: request.url,
            content_type: request.content_type,
            size: request.size,
            etag: request.etag,
        }
    }
}

/// Records metadata for an uploaded image
///
/// Called after the client's direct PUT succeeded. Every call appends a new
/// record; saving the same key twice yields two ids.
///
/// # Returns
///
/// Returns `201 CREATED` with the id of the new record
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - Malformed body, empty `key`/`url` or `contentType` outside `image/*`
/// - `500 INTERNAL_SERVER_ERROR` - The record could not be stored
#[instrument(skip(image_storage, payload))]
pub async fn save_image(
    Extension(image_storage): Extension<SharedImageRecordStore>,
    ValidatedJson(payload): ValidatedJson<SaveImageRequest>,
) -> Result<(StatusCode, Json<SaveImageResponse>), AppError> {
    let record = NewUploadRecord::from(payload);
    let id = image_storage.insert(&record).await?;

    info!(id, key = %record.key, "Saved image record");

    Ok((StatusCode::CREATED, Json(SaveImageResponse { id })))
}
