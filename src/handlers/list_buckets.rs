use crate::{app_state::AppState, types::BrowseError};
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Serialize)]
pub struct BucketList {
    buckets: Vec<String>,
}

/// GET /api/buckets - Buckets visible to the configured credentials
pub async fn list_buckets(
    State(app_state): State<AppState>,
) -> Result<Json<BucketList>, BrowseError> {
    let buckets = app_state.browser.list_buckets().await?;
    Ok(Json(BucketList { buckets }))
}
