use crate::{
    app_state::AppState,
    listing::{display_name, format_size},
    types::{BrowseError, ListingRequest, ObjectEntry, PathListing, SortKey},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for a folder listing
#[derive(Deserialize)]
pub struct ListPathQuery {
    #[serde(default)]
    prefix: String,
    search: Option<String>,
    sort: Option<String>,
    #[serde(default)]
    desc: bool,
}

#[derive(Serialize)]
pub struct FolderView {
    prefix: String,
    name: String,
}

#[derive(Serialize)]
pub struct FileView {
    key: String,
    name: String,
    size: u64,
    size_display: String,
    last_modified: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ListPathResponse {
    bucket: String,
    prefix: String,
    folders: Vec<FolderView>,
    files: Vec<FileView>,
}

impl From<ObjectEntry> for FileView {
    fn from(entry: ObjectEntry) -> Self {
        Self {
            name: display_name(&entry.key).to_string(),
            size_display: format_size(entry.size),
            key: entry.key,
            size: entry.size,
            last_modified: entry.last_modified,
        }
    }
}

/// GET /api/buckets/{bucket}/objects - Folders and files directly under a prefix
pub async fn list_path(
    Path(bucket): Path<String>,
    Query(params): Query<ListPathQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ListPathResponse>, BrowseError> {
    let sort_key = params
        .sort
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()?
        .unwrap_or_default();

    let mut request = ListingRequest::new(bucket.clone(), params.prefix).sorted_by(sort_key, params.desc);
    if let Some(search) = params.search {
        request = request.with_search(search);
    }

    let PathListing {
        prefix,
        folders,
        files,
    } = app_state.browser.list_path(&request).await?;

    Ok(Json(ListPathResponse {
        bucket,
        prefix,
        folders: folders
            .into_iter()
            .map(|prefix| FolderView {
                name: display_name(&prefix).to_string(),
                prefix,
            })
            .collect(),
        files: files.into_iter().map(FileView::from).collect(),
    }))
}
