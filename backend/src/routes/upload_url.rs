use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use super::validation::validate_image_content_type;
use crate::{
    presigner::UploadPresigner,
    types::{AppError, ValidatedJson},
    upload_key::generate_upload_key,
};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// Original file name, only its extension is used for the key
    pub filename: Option<String>,
    /// MIME type to bind into the signature, must be `image/*`
    #[validate(custom(function = "validate_image_content_type"))]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    /// Presigned URL to PUT the file to
    pub url: String,
    /// Object storage key, echoed back when saving the image
    pub key: String,
    /// Headers to send verbatim with the PUT, omitted when none are required
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Issues a presigned URL for a direct upload to object storage
///
/// Generates a fresh `uploads/...` key and signs a PUT for it. When
/// `contentType` is given it is part of the signature and returned in
/// `headers`; the client must send it unchanged.
///
/// # Returns
///
/// Returns `200 OK` with the URL, key and required headers
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - Malformed body or `contentType` outside `image/*`
/// - `500 INTERNAL_SERVER_ERROR` - The URL could not be signed
#[instrument(skip(presigner, payload))]
pub async fn create_upload_url(
    Extension(presigner): Extension<Arc<UploadPresigner>>,
    ValidatedJson(payload): ValidatedJson<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let key = generate_upload_key(payload.filename.as_deref());

    let upload = presigner
        .presign_upload(&key, payload.content_type.as_deref())
        .await?;

    info!(key = %key, expires_at = %upload.expires_at, "Issued presigned upload URL");

    Ok(Json(UploadUrlResponse {
        url: upload.url,
        key,
        headers: upload.headers,
    }))
}
