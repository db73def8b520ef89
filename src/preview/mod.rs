//! Paginated preview of delimited-text objects.

mod assembler;
mod cache;
mod index;
pub mod planner;
mod rows;

pub use assembler::PreviewAssembler;
pub use cache::RowIndexCache;
pub use index::{RowIndex, RowIndexBuilder, read_lines};
pub use planner::{PagePlan, PageSizeLimits, plan_page};
pub use rows::{DecodedText, RowFormat};

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PREVIEW_SIZE: u64 = 50_000_000;
pub const DEFAULT_PAGE_SIZE: u64 = 30_000;
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 8 * 1024 * 1024;
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1_000;
pub const DEFAULT_INDEX_CACHE_ENTRIES: usize = 16;

/// Tunables of the preview engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Objects above this many bytes are never fetched for preview
    pub max_preview_size: u64,
    pub default_page_size: u64,
    pub page_size_limits: PageSizeLimits,
    /// Objects above this many bytes are paged through a cached row index.
    /// `None` always decodes the whole object.
    pub streaming_threshold: Option<u64>,
    pub checkpoint_interval: u64,
    pub index_cache_entries: usize,
    pub delimiter: char,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_preview_size: DEFAULT_MAX_PREVIEW_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_limits: PageSizeLimits::default(),
            streaming_threshold: Some(DEFAULT_STREAMING_THRESHOLD),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            index_cache_entries: DEFAULT_INDEX_CACHE_ENTRIES,
            delimiter: ',',
        }
    }
}

impl PreviewSettings {
    pub fn validate(&self) -> Result<(), String> {
        let limits = self.page_size_limits;
        if limits.min == 0 || limits.min > limits.max {
            return Err(format!(
                "page size range {}-{} is empty or starts at zero",
                limits.min, limits.max
            ));
        }
        if !limits.contains(self.default_page_size) {
            return Err(format!(
                "default page size {} is outside {}-{}",
                self.default_page_size, limits.min, limits.max
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err("checkpoint interval must be at least 1".to_string());
        }
        if !self.delimiter.is_ascii() {
            return Err(format!("delimiter {:?} is not a single ASCII byte", self.delimiter));
        }
        // Line breaks end rows and the quote char opens quoted fields
        if matches!(self.delimiter, '\n' | '\r' | '"') {
            return Err(format!("delimiter {:?} is reserved", self.delimiter));
        }
        Ok(())
    }

    pub fn row_format(&self) -> RowFormat {
        RowFormat::new(self.delimiter as u8)
    }

    /// Whether an object of `size` bytes is paged through the row index
    pub fn streams(&self, size: u64) -> bool {
        self.streaming_threshold
            .is_some_and(|threshold| size > threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = PreviewSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_preview_size, 50_000_000);
        assert_eq!(settings.default_page_size, 30_000);
        assert_eq!(settings.page_size_limits, PageSizeLimits { min: 10_000, max: 50_000 });
    }

    #[test]
    fn test_invalid_settings() {
        let mut settings = PreviewSettings {
            default_page_size: 5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        settings.default_page_size = 10_000;
        settings.delimiter = '§';
        assert!(settings.validate().is_err());

        for reserved in ['\n', '\r', '"'] {
            settings.delimiter = reserved;
            assert!(settings.validate().is_err());
        }

        settings.delimiter = '\t';
        assert!(settings.validate().is_ok());

        settings.delimiter = ';';
        settings.page_size_limits = PageSizeLimits { min: 0, max: 10 };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_streaming_threshold() {
        let mut settings = PreviewSettings::default();
        assert!(!settings.streams(DEFAULT_STREAMING_THRESHOLD));
        assert!(settings.streams(DEFAULT_STREAMING_THRESHOLD + 1));

        settings.streaming_threshold = None;
        assert!(!settings.streams(u64::MAX));
    }
}
