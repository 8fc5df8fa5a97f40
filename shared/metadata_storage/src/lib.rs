//! Metadata storage for uploaded images
//!
//! This crate owns the relational side of the upload flow: the `images`
//! table, its migrations and the stores that append records to it.

pub mod image;

use sqlx::{migrate::Migrator, PgPool};

/// Embedded schema migrations for the metadata database
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Brings the schema up to date
///
/// Safe to call on every process start: already applied migrations are skipped.
///
/// # Errors
///
/// Returns `ImageStorageError::Migration` if a migration fails to apply
pub async fn run_migrations(pool: &PgPool) -> image::ImageStorageResult<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Metadata schema is up to date");
    Ok(())
}
