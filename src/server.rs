use crate::{app_state::AppState, handlers};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes and middleware
///
/// This function is used by both main.rs and integration tests to ensure
/// the same server configuration is used in both production and tests.
pub fn create_app(app_state: AppState) -> Router {
    use handlers::{download_link, list_buckets, list_path, not_found, preview_page};

    Router::new()
        .route("/api/buckets", get(list_buckets))
        // Folder listing: ?prefix=&search=&sort=&desc=
        .route("/api/buckets/{bucket}/objects", get(list_path))
        // Preview: ?key=&page_size=&page=
        .route("/api/buckets/{bucket}/preview", get(preview_page))
        // Download link: ?key=&ttl=
        .route("/api/buckets/{bucket}/download", get(download_link))
        // Fallback for 404 Not Found
        .fallback(not_found)
        // Add shared state
        .with_state(app_state)
        // Add tracing
        .layer(TraceLayer::new_for_http())
}
