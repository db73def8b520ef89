//! Caller-owned browsing state: where the user is and which file is previewed.
//!
//! The engine itself keeps no session state; a UI layer holds one
//! `BrowsingSession` per user and passes the requests it builds to the browser.

use crate::listing::parent_prefix;
use crate::types::{ListingRequest, Page, SortKey};
use serde::Serialize;

/// State of the single active preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSession {
    pub bucket: String,
    pub key: String,
    pub total_rows: Option<u64>,
    pub page_size: u64,
    pub current_page: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingContext {
    search: String,
    sort_key: SortKey,
    descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsingSession {
    bucket: String,
    current_path: String,
    preview: Option<PreviewSession>,
    context: ListingContext,
}

impl BrowsingSession {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            current_path: String::new(),
            preview: None,
            context: ListingContext {
                search: String::new(),
                sort_key: SortKey::LastModified,
                descending: true,
            },
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn preview(&self) -> Option<&PreviewSession> {
        self.preview.as_ref()
    }

    pub fn is_at_root(&self) -> bool {
        self.current_path.is_empty()
    }

    /// Switching buckets starts over at the root
    pub fn select_bucket(&mut self, bucket: &str) {
        if bucket != self.bucket {
            tracing::debug!("Switching bucket {} -> {}", self.bucket, bucket);
            self.bucket = bucket.to_string();
            self.current_path.clear();
            self.preview = None;
        }
    }

    pub fn enter_folder(&mut self, folder: &str) {
        self.current_path = folder.to_string();
        self.preview = None;
    }

    pub fn go_back(&mut self) {
        self.current_path = parent_prefix(&self.current_path);
        self.preview = None;
    }

    pub fn go_home(&mut self) {
        self.current_path.clear();
        self.preview = None;
    }

    /// Build the listing request for the current folder.
    ///
    /// A changed search or sort drops the active preview, unless the caller is
    /// in the middle of opening `view_requested`.
    pub fn listing_request(
        &mut self,
        search: Option<&str>,
        sort_key: SortKey,
        descending: bool,
        view_requested: Option<&str>,
    ) -> ListingRequest {
        let context = ListingContext {
            search: search.unwrap_or_default().to_string(),
            sort_key,
            descending,
        };

        if context != self.context && view_requested.is_none() {
            self.preview = None;
        }
        self.context = context;

        let mut request = ListingRequest::new(self.bucket.clone(), self.current_path.clone())
            .sorted_by(sort_key, descending);
        if !self.context.search.is_empty() {
            request = request.with_search(self.context.search.clone());
        }
        request
    }

    /// Open `key` for preview on page 1, replacing any other preview
    pub fn select_file(&mut self, key: &str, page_size: u64) -> &PreviewSession {
        self.preview.insert(PreviewSession {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            total_rows: None,
            page_size,
            current_page: 1,
        })
    }

    /// Move the active preview to another page or page size
    pub fn turn_page(&mut self, page: u64, page_size: u64) {
        if let Some(preview) = self.preview.as_mut() {
            preview.current_page = page;
            preview.page_size = page_size;
        }
    }

    /// Record what the engine returned for the active preview
    pub fn record_page(&mut self, page: &Page) {
        if let Some(preview) = self.preview.as_mut() {
            preview.total_rows = Some(page.total_rows);
            preview.current_page = page.page;
            preview.page_size = page.page_size;
        }
    }
}
