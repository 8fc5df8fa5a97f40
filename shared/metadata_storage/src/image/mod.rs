//! Image metadata storage integration using PostgreSQL
//!
//! One row per object the client has uploaded through a presigned URL.
//! Rows are append-only: there is no update or delete.

mod error;
#[cfg(feature = "test-utils")]
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

pub use error::{ImageStorageError, ImageStorageResult};
#[cfg(feature = "test-utils")]
pub use memory::InMemoryImageStorage;

/// A stored upload record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UploadRecord {
    /// Server-assigned identifier (Primary Key)
    pub id: i64,
    /// Object storage key
    pub key: String,
    /// Accessible URL of the stored object
    pub url: String,
    /// MIME type, always `image/*` when present
    pub content_type: Option<String>,
    /// Object size in bytes
    pub size: Option<i64>,
    /// Integrity token reported by the storage provider
    #[sqlx(rename = "e_tag")]
    pub etag: Option<String>,
    /// Insertion time
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when appending a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUploadRecord {
    /// Object storage key, non-empty
    pub key: String,
    /// Accessible URL of the stored object, non-empty
    pub url: String,
    /// MIME type, already validated as `image/*`
    pub content_type: Option<String>,
    /// Object size in bytes
    pub size: Option<i64>,
    /// Integrity token reported by the storage provider
    pub etag: Option<String>,
}

/// Append-only store of upload records
///
/// Input validation happens before a record reaches the store.
#[async_trait]
pub trait ImageRecordStore: Send + Sync {
    /// Appends a record and returns its assigned identifier
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError` if the record could not be persisted
    async fn insert(&self, record: &NewUploadRecord) -> ImageStorageResult<i64>;

    /// Gets a record by identifier
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError` if the lookup fails
    async fn get_by_id(&self, id: i64) -> ImageStorageResult<Option<UploadRecord>>;

    /// Lists all records saved under a storage key, oldest first
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError` if the lookup fails
    async fn list_by_key(&self, key: &str) -> ImageStorageResult<Vec<UploadRecord>>;
}

/// Store handle shared across request handlers
pub type SharedImageRecordStore = Arc<dyn ImageRecordStore>;

/// PostgreSQL-backed image metadata storage
#[derive(Clone)]
pub struct PgImageStorage {
    pool: PgPool,
}

impl PgImageStorage {
    /// Creates a new image metadata storage client
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool for the metadata database
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRecordStore for PgImageStorage {
    #[instrument(skip(self, record), fields(key = %record.key), err)]
    async fn insert(&self, record: &NewUploadRecord) -> ImageStorageResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO images (key, url, content_type, size, e_tag)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&record.key)
        .bind(&record.url)
        .bind(record.content_type.as_deref())
        .bind(record.size)
        .bind(record.etag.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: i64) -> ImageStorageResult<Option<UploadRecord>> {
        let record = sqlx::query_as::<_, UploadRecord>(
            "SELECT id, key, url, content_type, size, e_tag, created_at FROM images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn list_by_key(&self, key: &str) -> ImageStorageResult<Vec<UploadRecord>> {
        let records = sqlx::query_as::<_, UploadRecord>(
            r"
            SELECT id, key, url, content_type, size, e_tag, created_at
            FROM images
            WHERE key = $1
            ORDER BY id
            ",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
