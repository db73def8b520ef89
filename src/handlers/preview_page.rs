use crate::{
    app_state::AppState,
    types::{BrowseError, Page},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

/// Query parameters for a preview page
#[derive(Deserialize)]
pub struct PreviewQuery {
    key: String,
    page_size: Option<u64>,
    page: Option<u64>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    bucket: String,
    key: String,
    summary: String,
    #[serde(flatten)]
    page: Page,
}

/// GET /api/buckets/{bucket}/preview?key=... - One page of a delimited-text object
pub async fn preview_page(
    Path(bucket): Path<String>,
    Query(params): Query<PreviewQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<PreviewResponse>, BrowseError> {
    let page = app_state
        .browser
        .preview_page(
            &bucket,
            &params.key,
            params.page_size,
            params.page.unwrap_or(1),
        )
        .await?;

    Ok(Json(PreviewResponse {
        summary: page.summary(),
        bucket,
        key: params.key,
        page,
    }))
}
