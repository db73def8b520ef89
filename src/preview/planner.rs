//! Page window arithmetic over 1-indexed data rows.
//!
//! The header line is never part of the window: row `1` is the first data row
//! and `total_rows` the last one.

use crate::types::BrowseError;
use serde::{Deserialize, Serialize};

/// Inclusive bounds on the page size a caller may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeLimits {
    pub min: u64,
    pub max: u64,
}

impl Default for PageSizeLimits {
    fn default() -> Self {
        Self {
            min: 10_000,
            max: 50_000,
        }
    }
}

impl PageSizeLimits {
    pub fn contains(&self, page_size: u64) -> bool {
        (self.min..=self.max).contains(&page_size)
    }
}

/// A validated page request. `start..end` is half-open over data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub page: u64,
    pub page_size: u64,
    pub max_page: u64,
    pub start: u64,
    pub end: u64,
    pub total_rows: u64,
}

impl PagePlan {
    pub fn row_count(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Last data row shown, as reported to the caller
    pub fn last_row(&self) -> u64 {
        (self.end - 1).min(self.total_rows)
    }
}

pub fn max_page(total_rows: u64, page_size: u64) -> u64 {
    total_rows / page_size + 1
}

/// Page size validation, usable before the row count is known
pub fn check_page_size(page_size: u64, limits: PageSizeLimits) -> Result<(), BrowseError> {
    if page_size == 0 || !limits.contains(page_size) {
        return Err(BrowseError::InvalidPageSize {
            page_size,
            min: limits.min,
            max: limits.max,
        });
    }
    Ok(())
}

/// Plan `page` of `total_rows` data rows. Out of range pages are rejected, never clamped.
pub fn plan_page(
    total_rows: u64,
    page_size: u64,
    page: u64,
    limits: PageSizeLimits,
) -> Result<PagePlan, BrowseError> {
    check_page_size(page_size, limits)?;

    let max_page = max_page(total_rows, page_size);
    if page < 1 || page > max_page {
        return Err(BrowseError::InvalidPage { page, max_page });
    }

    let start = (page - 1) * page_size + 1;
    let end = (start + page_size).min(total_rows + 1);

    Ok(PagePlan {
        page,
        page_size,
        max_page,
        start,
        end,
        total_rows,
    })
}
