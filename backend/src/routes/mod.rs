pub mod images;
pub mod upload_url;
pub mod validation;

use axum::{routing::post, Router};

/// Creates the router with all handler routes
pub fn handler() -> Router {
    Router::new()
        .route("/api/upload-url", post(upload_url::create_upload_url))
        .route("/api/images", post(images::save_image))
}
