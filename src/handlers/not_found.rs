use crate::types::BrowseError;
use axum::response::{IntoResponse, Response};

/// Fallback handler for 404 Not Found
pub async fn not_found() -> Response {
    BrowseError::NotFound("no such route".to_string()).into_response()
}
