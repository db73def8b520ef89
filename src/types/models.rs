use super::error::BrowseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents an S3 object metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    pub content_type: String,
}

impl ObjectMetadata {
    /// Version of the object content, used to invalidate cached row indexes
    pub fn version(&self) -> ObjectVersion {
        ObjectVersion {
            etag: self.etag.clone(),
            last_modified: self.last_modified,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersion {
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl ObjectVersion {
    /// Etag to send as a read precondition. Stores that report no etag get none.
    pub fn if_match(&self) -> Option<&str> {
        Some(self.etag.as_str()).filter(|etag| !etag.is_empty())
    }
}

/// Raw result of a delimited listing call: common prefixes and direct children
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub folders: Vec<String>,
    pub objects: Vec<ObjectMetadata>,
}

/// A file shown in a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl From<ObjectMetadata> for ObjectEntry {
    fn from(metadata: ObjectMetadata) -> Self {
        Self {
            key: metadata.key,
            size: metadata.size,
            last_modified: metadata.last_modified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Name,
    Size,
    LastModified,
}

impl FromStr for SortKey {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" | "key" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            "lastmodified" | "last_modified" => Ok(SortKey::LastModified),
            other => Err(BrowseError::InvalidRequest(format!(
                "unknown sort key '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => f.write_str("Name"),
            SortKey::Size => f.write_str("Size"),
            SortKey::LastModified => f.write_str("LastModified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub bucket: String,
    pub prefix: String,
    pub search: Option<String>,
    pub sort_key: SortKey,
    pub descending: bool,
}

impl ListingRequest {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            search: None,
            sort_key: SortKey::Name,
            descending: false,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sorted_by(mut self, sort_key: SortKey, descending: bool) -> Self {
        self.sort_key = sort_key;
        self.descending = descending;
        self
    }
}

/// Folders and files directly under a prefix
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathListing {
    pub prefix: String,
    pub folders: Vec<String>,
    pub files: Vec<ObjectEntry>,
}

/// A page of a delimited-text preview. `rows[0]` is always the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub rows: Vec<Vec<String>>,
    pub start_row_index: u64,
    pub end_row_index: u64,
    pub total_rows: u64,
    pub page: u64,
    pub page_size: u64,
    pub max_page: u64,
}

impl Page {
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Human readable range line shown above a preview table
    pub fn summary(&self) -> String {
        format!(
            "Showing rows {} to {} of {}",
            self.start_row_index, self.end_row_index, self.total_rows
        )
    }
}

/// Time-limited download link for an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub bucket: String,
    pub key: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
