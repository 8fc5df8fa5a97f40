//! Error types for image metadata storage operations

use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Result type for image metadata storage operations
pub type ImageStorageResult<T> = Result<T, ImageStorageError>;

/// Errors that can occur during image metadata storage operations
#[derive(Error, Debug)]
pub enum ImageStorageError {
    /// Query failed (connectivity, constraint violation, decoding)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}
