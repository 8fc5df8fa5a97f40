//! Image Upload Backend service
//!
//! Issues presigned S3 upload URLs and records metadata for uploaded images.

#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery)]

/// Presigned S3 upload URLs
pub mod presigner;

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// Configuration, errors and extractors
pub mod types;

/// Object key generation
pub mod upload_key;
