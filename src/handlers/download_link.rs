use crate::{
    app_state::AppState,
    types::{BrowseError, DownloadLink},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::time::Duration;

/// Query parameters for a download link
#[derive(Deserialize)]
pub struct DownloadQuery {
    key: String,
    ttl: Option<u64>,
}

/// GET /api/buckets/{bucket}/download?key=... - Presigned URL for a direct download
pub async fn download_link(
    Path(bucket): Path<String>,
    Query(params): Query<DownloadQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<DownloadLink>, BrowseError> {
    let link = app_state
        .browser
        .download_link(&bucket, &params.key, params.ttl.map(Duration::from_secs))
        .await?;
    Ok(Json(link))
}
