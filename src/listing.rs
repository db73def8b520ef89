//! Folder listings with search and sort.
//!
//! Only the direct children of a prefix are listed. Folders keep the store's
//! common-prefix order; they are not sorted or filtered with the files.

use crate::storage::StorageBackend;
use crate::types::{BrowseError, ListingRequest, ObjectEntry, PathListing, SortKey};

pub const DELIMITER: &str = "/";

pub async fn list_path(
    storage: &dyn StorageBackend,
    request: &ListingRequest,
) -> Result<PathListing, BrowseError> {
    let listing = storage
        .list_objects(&request.bucket, &request.prefix, DELIMITER)
        .await?;

    let files: Vec<ObjectEntry> = listing
        .objects
        .into_iter()
        .filter(|obj| !obj.key.ends_with(DELIMITER))
        .map(ObjectEntry::from)
        .collect();

    let mut files = filter_by_search(files, request.search.as_deref());
    sort_entries(&mut files, request.sort_key, request.descending);

    Ok(PathListing {
        prefix: request.prefix.clone(),
        folders: listing.folders,
        files,
    })
}

/// Keep entries whose key contains `search`, ignoring case. An empty term keeps everything.
pub fn filter_by_search(files: Vec<ObjectEntry>, search: Option<&str>) -> Vec<ObjectEntry> {
    match search.map(str::to_lowercase) {
        Some(term) if !term.is_empty() => files
            .into_iter()
            .filter(|entry| entry.key.to_lowercase().contains(&term))
            .collect(),
        _ => files,
    }
}

/// Stable sort: entries with equal keys keep their relative order in both directions
pub fn sort_entries(files: &mut [ObjectEntry], sort_key: SortKey, descending: bool) {
    files.sort_by(|a, b| {
        let ordering = match sort_key {
            SortKey::Name => a.key.cmp(&b.key),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::LastModified => a.last_modified.cmp(&b.last_modified),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Last path segment of a key or folder, `a/c/` gives `c`
pub fn display_name(path: &str) -> &str {
    path.trim_end_matches(DELIMITER)
        .rsplit(DELIMITER)
        .next()
        .unwrap_or_default()
}

/// Folder containing `path`, `a/b/c/` gives `a/b/` and `a/` gives the root
pub fn parent_prefix(path: &str) -> String {
    let trimmed = path.trim_end_matches(DELIMITER);
    match trimmed.rfind(DELIMITER) {
        Some(idx) => trimmed[..idx + DELIMITER.len()].to_string(),
        None => String::new(),
    }
}

/// Decimal size label, as shown next to each file
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes >= 1e9 {
        format!("{:.2} GB", bytes / 1e9)
    } else if bytes >= 1e6 {
        format!("{:.2} MB", bytes / 1e6)
    } else {
        format!("{:.2} KB", bytes / 1e3)
    }
}
