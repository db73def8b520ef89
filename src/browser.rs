use crate::listing;
use crate::preview::{PreviewAssembler, PreviewSettings};
use crate::storage::StorageBackend;
use crate::types::{BrowseError, DownloadLink, ListingRequest, Page, PathListing};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(3600);
/// Longest validity S3 accepts for a presigned URL
pub const MAX_PRESIGN_TTL: Duration = Duration::from_secs(604_800);

/// Download links live between one second and [`MAX_PRESIGN_TTL`]
pub fn check_presign_ttl(ttl: Duration) -> Result<(), BrowseError> {
    if ttl.is_zero() || ttl > MAX_PRESIGN_TTL {
        return Err(BrowseError::InvalidRequest(format!(
            "download link lifetime must be between 1 and {} seconds",
            MAX_PRESIGN_TTL.as_secs()
        )));
    }
    Ok(())
}

/// Entry point for callers: listings, preview pages and download links
pub struct BucketBrowser {
    storage: Arc<dyn StorageBackend>,
    assembler: PreviewAssembler,
    presign_ttl: Duration,
}

impl BucketBrowser {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        settings: PreviewSettings,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            assembler: PreviewAssembler::new(Arc::clone(&storage), settings),
            storage,
            presign_ttl,
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        self.assembler.settings()
    }

    pub async fn list_buckets(&self) -> Result<Vec<String>, BrowseError> {
        tracing::info!("LIST buckets");
        self.storage.list_buckets().await.inspect_err(|e| {
            tracing::warn!("Failed to list buckets: {}", e);
        })
    }

    pub async fn list_path(&self, request: &ListingRequest) -> Result<PathListing, BrowseError> {
        tracing::info!(
            "LIST path: bucket={}, prefix={:?}, search={:?}, sort={}, desc={}",
            request.bucket,
            request.prefix,
            request.search,
            request.sort_key,
            request.descending
        );

        listing::list_path(self.storage.as_ref(), request)
            .await
            .inspect_err(|e| {
                tracing::warn!("Failed to list {}/{}: {}", request.bucket, request.prefix, e);
            })
    }

    /// Page `page` of `key` with `page_size` data rows. `None` uses the configured default.
    pub async fn preview_page(
        &self,
        bucket: &str,
        key: &str,
        page_size: Option<u64>,
        page: u64,
    ) -> Result<Page, BrowseError> {
        let page_size = page_size.unwrap_or(self.settings().default_page_size);
        tracing::info!(
            "PREVIEW: bucket={}, key={}, page={}, page_size={}",
            bucket,
            key,
            page,
            page_size
        );

        self.assembler
            .assemble(bucket, key, page_size, page)
            .await
            .inspect(|page| {
                tracing::debug!("{}", page.summary());
            })
            .inspect_err(|e| {
                tracing::warn!("Cannot preview {}/{}: {}", bucket, key, e);
            })
    }

    /// Time-limited URL for downloading `key`. `None` uses the configured TTL.
    pub async fn download_link(
        &self,
        bucket: &str,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<DownloadLink, BrowseError> {
        let ttl = ttl.unwrap_or(self.presign_ttl);
        tracing::info!("PRESIGN: bucket={}, key={}, ttl={:?}", bucket, key, ttl);

        check_presign_ttl(ttl)?;

        let issued_at = chrono::Utc::now();
        let url = self
            .storage
            .presigned_url(bucket, key, ttl)
            .await
            .inspect_err(|e| {
                tracing::warn!("Failed to presign {}/{}: {}", bucket, key, e);
            })?;

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| BrowseError::Internal(format!("ttl {:?} out of range", ttl)))?;

        Ok(DownloadLink {
            bucket: bucket.to_string(),
            key: key.to_string(),
            url,
            expires_at,
        })
    }
}
