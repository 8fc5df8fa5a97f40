use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use axum::{body::Body, http::Request, response::Response, Router};
use image_upload_backend::{
    presigner::{UploadPresigner, DEFAULT_PRESIGN_EXPIRY},
    server,
    types::Environment,
};
use metadata_storage::image::{
    ImageRecordStore, ImageStorageError, ImageStorageResult, InMemoryImageStorage,
    NewUploadRecord, SharedImageRecordStore, UploadRecord,
};
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "test-bucket";
pub const TEST_REGION: &str = "ap-northeast-1";
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client pointed at LocalStack with static test credentials
///
/// Presigning never leaves the process, so this client works without LocalStack running.
pub fn test_s3_client() -> Arc<S3Client> {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .force_path_style(true)
        .credentials_provider(Credentials::from_keys("test", "test", None))
        .build();

    Arc::new(S3Client::from_conf(config))
}

/// Store that rejects every operation
pub struct FailingImageStorage;

#[async_trait]
impl ImageRecordStore for FailingImageStorage {
    async fn insert(&self, _record: &NewUploadRecord) -> ImageStorageResult<i64> {
        Err(ImageStorageError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get_by_id(&self, _id: i64) -> ImageStorageResult<Option<UploadRecord>> {
        Err(ImageStorageError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_by_key(&self, _key: &str) -> ImageStorageResult<Vec<UploadRecord>> {
        Err(ImageStorageError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Router wired to an in-memory store and an offline presigner
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub s3_client: Arc<S3Client>,
    pub image_storage: Arc<InMemoryImageStorage>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_presign_expiry(DEFAULT_PRESIGN_EXPIRY)
    }

    pub fn with_presign_expiry(expiry: Duration) -> Self {
        let image_storage = Arc::new(InMemoryImageStorage::new());
        Self::build(
            Environment::Development {
                presign_expiry_override: None,
            },
            expiry,
            image_storage.clone(),
            image_storage,
        )
    }

    /// Routes record writes to `store` instead of the in-memory store
    pub fn with_image_storage(store: SharedImageRecordStore) -> Self {
        Self::build(
            Environment::Development {
                presign_expiry_override: None,
            },
            DEFAULT_PRESIGN_EXPIRY,
            store,
            Arc::new(InMemoryImageStorage::new()),
        )
    }

    fn build(
        environment: Environment,
        expiry: Duration,
        store: SharedImageRecordStore,
        image_storage: Arc<InMemoryImageStorage>,
    ) -> Self {
        setup_test_env();

        let s3_client = test_s3_client();
        let presigner = Arc::new(UploadPresigner::new(
            s3_client.clone(),
            TEST_BUCKET.to_string(),
            expiry,
        ));

        let router = server::build_router(&environment, presigner, store);

        Self {
            router,
            environment,
            s3_client,
            image_storage,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, &payload.to_string(), Some("application/json"))
            .await
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: &str,
        content_type: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method("POST");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(Body::from(body.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Reads back a stored record through the store interface
    pub async fn stored_record(&self, id: i64) -> Option<UploadRecord> {
        self.image_storage
            .get_by_id(id)
            .await
            .expect("in-memory lookup failed")
    }
}
