use super::cache::RowIndexCache;
use super::index::{RowIndex, read_lines};
use super::planner::{self, PagePlan};
use super::rows::{DecodedText, RowFormat};
use super::PreviewSettings;
use crate::storage::{ByteRange, ObjectStream, StorageBackend};
use crate::types::{BrowseError, ObjectMetadata, Page};
use futures::StreamExt;
use std::sync::Arc;

/// Builds preview pages for delimited-text objects
pub struct PreviewAssembler {
    storage: Arc<dyn StorageBackend>,
    settings: PreviewSettings,
    format: RowFormat,
    cache: RowIndexCache,
}

/// Header and data lines of one page, before field splitting
struct RawPage {
    plan: PagePlan,
    header: String,
    lines: Vec<String>,
}

impl PreviewAssembler {
    pub fn new(storage: Arc<dyn StorageBackend>, settings: PreviewSettings) -> Self {
        let format = settings.row_format();
        let cache = RowIndexCache::new(settings.index_cache_entries);
        Self {
            storage,
            settings,
            format,
            cache,
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Page `page` (1-indexed) of `page_size` data rows, header first
    pub async fn assemble(
        &self,
        bucket: &str,
        key: &str,
        page_size: u64,
        page: u64,
    ) -> Result<Page, BrowseError> {
        planner::check_page_size(page_size, self.settings.page_size_limits)?;

        let metadata = self.storage.head_object(bucket, key).await?;
        if metadata.size > self.settings.max_preview_size {
            tracing::info!(
                "{}/{} is {} bytes, above the preview limit",
                bucket,
                key,
                metadata.size
            );
            return Err(BrowseError::TooLarge {
                size: metadata.size,
                limit: self.settings.max_preview_size,
            });
        }

        let raw = if self.settings.streams(metadata.size) {
            self.streamed_page(bucket, &metadata, page_size, page).await?
        } else {
            self.decoded_page(bucket, &metadata, page_size, page).await?
        };

        let mut rows = Vec::with_capacity(raw.lines.len() + 1);
        rows.push(self.format.parse(&raw.header)?);
        for line in &raw.lines {
            rows.push(self.format.parse(line)?);
        }

        Ok(Page {
            rows,
            start_row_index: raw.plan.start,
            end_row_index: raw.plan.last_row(),
            total_rows: raw.plan.total_rows,
            page: raw.plan.page,
            page_size: raw.plan.page_size,
            max_page: raw.plan.max_page,
        })
    }

    /// Full-decode strategy: fetch everything, slice the lines
    async fn decoded_page(
        &self,
        bucket: &str,
        metadata: &ObjectMetadata,
        page_size: u64,
        page: u64,
    ) -> Result<RawPage, BrowseError> {
        tracing::debug!("Decoding {}/{} in full", bucket, metadata.key);

        let version = metadata.version();
        let body = self
            .storage
            .get_object(bucket, &metadata.key, None, version.if_match())
            .await?;
        let data = collect_capped(body, metadata.size, self.settings.max_preview_size).await?;
        let text = DecodedText::decode(data)?;

        let plan = planner::plan_page(
            text.total_rows(),
            page_size,
            page,
            self.settings.page_size_limits,
        )?;

        Ok(RawPage {
            plan,
            header: text.header().to_string(),
            lines: text.rows(plan.start, plan.end).map(str::to_string).collect(),
        })
    }

    /// Streaming strategy: resume from the nearest indexed checkpoint
    async fn streamed_page(
        &self,
        bucket: &str,
        metadata: &ObjectMetadata,
        page_size: u64,
        page: u64,
    ) -> Result<RawPage, BrowseError> {
        let index = self.row_index(bucket, metadata).await?;

        let plan = planner::plan_page(
            index.total_rows(),
            page_size,
            page,
            self.settings.page_size_limits,
        )?;

        let lines = if plan.is_empty() {
            Vec::new()
        } else {
            let (line, offset) = index.checkpoint_before(plan.start);
            let range = match index.checkpoint_after(plan.end) {
                Some(next) => ByteRange::inclusive(offset, next - 1),
                None => ByteRange::from_offset(offset),
            };
            tracing::debug!(
                "Reading rows {}..{} of {}/{} from {}",
                plan.start,
                plan.end,
                bucket,
                metadata.key,
                range
            );

            let body = self
                .storage
                .get_object(bucket, &metadata.key, Some(range), index.version.if_match())
                .await?;
            read_lines(body, plan.start - line, plan.row_count()).await?
        };

        if lines.len() as u64 != plan.row_count() {
            return Err(BrowseError::Unavailable(format!(
                "{} changed while it was being read",
                metadata.key
            )));
        }

        Ok(RawPage {
            plan,
            header: index.header.clone(),
            lines,
        })
    }

    async fn row_index(
        &self,
        bucket: &str,
        metadata: &ObjectMetadata,
    ) -> Result<Arc<RowIndex>, BrowseError> {
        let version = metadata.version();
        if let Some(index) = self.cache.get(bucket, &metadata.key, &version).await {
            return Ok(index);
        }

        tracing::info!("Indexing rows of {}/{}", bucket, metadata.key);
        let body = self
            .storage
            .get_object(bucket, &metadata.key, None, version.if_match())
            .await?;
        let index = RowIndex::build(body, version, self.settings.checkpoint_interval).await?;
        tracing::debug!(
            "Indexed {} rows of {}/{} with {} checkpoints",
            index.total_rows(),
            bucket,
            metadata.key,
            index.checkpoint_count()
        );

        Ok(self.cache.insert(bucket, &metadata.key, index).await)
    }
}

/// Collect a body, failing once it grows past `limit` bytes
async fn collect_capped(
    mut body: ObjectStream,
    expected: u64,
    limit: u64,
) -> Result<Vec<u8>, BrowseError> {
    let mut data = Vec::with_capacity(expected.min(limit) as usize);
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let size = (data.len() + chunk.len()) as u64;
        if size > limit {
            return Err(BrowseError::TooLarge { size, limit });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
