use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use aws_sdk_s3::Client as S3Client;
use image_upload_backend::{presigner::UploadPresigner, server, types::Environment};
use metadata_storage::image::{PgImageStorage, SharedImageRecordStore};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    // Configure logging format based on environment
    // Use JSON format for staging/production, regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let bucket_name = environment.s3_bucket()?;
    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await?));
    let presigner = Arc::new(UploadPresigner::new(
        s3_client,
        bucket_name,
        environment.presigned_url_expiry(),
    ));
    presigner
        .check_expiry()
        .context("Invalid presigned URL expiry")?;

    info!("✅ Initialized upload presigner for bucket {}", presigner.bucket_name());

    let database_config = environment.database_config()?;
    let pool = PgPoolOptions::new()
        .max_connections(database_config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(database_config.connect_options()?)
        .await
        .context("Failed to connect to the metadata database")?;

    metadata_storage::run_migrations(&pool)
        .await
        .context("Failed to migrate the metadata database")?;

    let image_storage: SharedImageRecordStore = Arc::new(PgImageStorage::new(pool));

    info!("✅ Initialized image metadata storage");

    server::start(environment, presigner, image_storage).await
}
