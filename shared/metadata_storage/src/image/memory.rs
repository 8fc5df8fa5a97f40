//! In-memory image metadata storage for tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{ImageRecordStore, ImageStorageResult, NewUploadRecord, UploadRecord};

/// Vector-backed store with sequential identifiers starting at 1
#[derive(Debug, Default)]
pub struct InMemoryImageStorage {
    records: Mutex<Vec<UploadRecord>>,
}

impl InMemoryImageStorage {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("records lock poisoned").len()
    }

    /// Whether no record has been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageRecordStore for InMemoryImageStorage {
    async fn insert(&self, record: &NewUploadRecord) -> ImageStorageResult<i64> {
        let mut records = self.records.lock().expect("records lock poisoned");
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX - 1) + 1;

        records.push(UploadRecord {
            id,
            key: record.key.clone(),
            url: record.url.clone(),
            content_type: record.content_type.clone(),
            size: record.size,
            etag: record.etag.clone(),
            created_at: Utc::now(),
        });

        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> ImageStorageResult<Option<UploadRecord>> {
        let records = self.records.lock().expect("records lock poisoned");
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_key(&self, key: &str) -> ImageStorageResult<Vec<UploadRecord>> {
        let records = self.records.lock().expect("records lock poisoned");
        Ok(records.iter().filter(|r| r.key == key).cloned().collect())
    }
}
