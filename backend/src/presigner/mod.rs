//! Presigned S3 upload URLs
mod error;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

pub use error::{PresignError, PresignResult};

/// Expiry used when the caller does not ask for one
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// Presigned PUT request handed to the uploading client
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// The presigned URL for the PUT request
    pub url: String,
    /// Headers the client must send verbatim with the PUT
    pub headers: BTreeMap<String, String>,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Signs direct-to-bucket uploads
pub struct UploadPresigner {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    expiry: Duration,
}

impl UploadPresigner {
    /// Creates a new upload presigner
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket that receives the uploads
    /// * `expiry` - Lifetime of issued URLs, zero selects [`DEFAULT_PRESIGN_EXPIRY`]
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, expiry: Duration) -> Self {
        Self {
            s3_client,
            bucket_name,
            expiry,
        }
    }

    /// Bucket that receives the uploads
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Checks that the configured expiry is accepted by the signer
    ///
    /// # Errors
    ///
    /// Returns `PresignError::ConfigError` if the expiry is out of range
    pub fn check_expiry(&self) -> PresignResult<()> {
        presigning_config(self.expiry).map(|_| ())
    }

    /// Presigns a PUT for `key` with the configured expiry
    ///
    /// # Errors
    ///
    /// See [`Self::presign_put_object`]
    pub async fn presign_upload(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> PresignResult<PresignedUpload> {
        self.presign_put_object(key, content_type, self.expiry).await
    }

    /// Generates a presigned URL for PUT operations
    ///
    /// A non-empty `content_type` becomes part of the signature; the returned
    /// headers then carry `Content-Type` and the upload fails unless the
    /// client sends that exact value.
    ///
    /// # Arguments
    ///
    /// * `key` - Object key to write
    /// * `content_type` - Optional MIME type to bind into the signature
    /// * `expires_in` - URL lifetime, zero selects [`DEFAULT_PRESIGN_EXPIRY`]
    ///
    /// # Errors
    ///
    /// Returns `PresignError::InvalidInput` if `key` is empty
    /// Returns `PresignError::ConfigError` if the expiry is out of range
    /// Returns `PresignError::S3Error` if the SDK fails to sign the request
    pub async fn presign_put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> PresignResult<PresignedUpload> {
        if key.is_empty() {
            return Err(PresignError::InvalidInput("object key is empty".to_string()));
        }

        let expires_in = effective_expiry(expires_in);
        let presigning_config = presigning_config(expires_in)?;

        let content_type = content_type.filter(|ct| !ct.is_empty());

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .set_content_type(content_type.map(ToString::to_string))
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                error!("Failed to presign upload for {key}: {e}");
                PresignError::from(e)
            })?;

        let headers: BTreeMap<String, String> = presigned_request
            .headers()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
            .map(|(name, value)| (canonical_header_name(name), value.to_string()))
            .collect();

        debug!(key, ?headers, "Presigned upload URL");

        Ok(PresignedUpload {
            url: presigned_request.uri().to_string(),
            headers,
            expires_at: Utc::now() + expires_in,
        })
    }
}

const fn effective_expiry(expiry: Duration) -> Duration {
    if expiry.is_zero() {
        DEFAULT_PRESIGN_EXPIRY
    } else {
        expiry
    }
}

fn presigning_config(expiry: Duration) -> PresignResult<PresigningConfig> {
    PresigningConfig::expires_in(effective_expiry(expiry)).map_err(|e| {
        PresignError::ConfigError(format!("Failed to create presigning config: {e}"))
    })
}

/// Title-cases a header name (`content-type` -> `Content-Type`)
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
