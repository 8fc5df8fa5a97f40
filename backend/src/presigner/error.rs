//! Error types for presigning operations

use aws_sdk_s3::{error::SdkError, operation::put_object::PutObjectError};
use thiserror::Error;

/// Result type for presigning operations
pub type PresignResult<T> = Result<T, PresignError>;

/// Errors that can occur while presigning an upload
#[derive(Error, Debug)]
pub enum PresignError {
    /// S3 SDK failed to sign the request (credentials, endpoint resolution)
    #[error("S3 presign error: {0}")]
    S3Error(String),

    /// Presigning configuration rejected (expiry out of range)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<SdkError<PutObjectError>> for PresignError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        Self::S3Error(error.to_string())
    }
}
