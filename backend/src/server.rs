use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderValue, Extension};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use metadata_storage::image::SharedImageRecordStore;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::routes;
use crate::{presigner::UploadPresigner, types::Environment};

/// Upper bound for handling a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the application router with all shared dependencies attached
#[must_use]
pub fn build_router(
    environment: &Environment,
    presigner: Arc<UploadPresigner>,
    image_storage: SharedImageRecordStore,
) -> axum::Router {
    let cors = cors_layer(environment);

    routes::handler()
        .layer(Extension(presigner))
        .layer(Extension(image_storage))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        .layer(CatchPanicLayer::new())
}

fn cors_layer(environment: &Environment) -> CorsLayer {
    let allow_origin = match environment.cors_allowed_origins() {
        Some(origins) => AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| tracing::warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        })),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    presigner: Arc<UploadPresigner>,
    image_storage: SharedImageRecordStore,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()?));
    let router = build_router(&environment, presigner, image_storage);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Image Upload Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
