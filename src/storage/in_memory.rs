use super::backend::{ByteRange, ObjectStream, StorageBackend};
use crate::types::{BrowseError, ObjectListing, ObjectMetadata};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// In-memory storage backend for testing/development
#[derive(Clone)]
pub struct InMemoryStorage {
    buckets: Arc<RwLock<HashMap<String, BTreeMap<String, StoredObject>>>>,
    get_calls: Arc<AtomicUsize>,
    chunk_size: usize,
    latency: Option<Duration>,
}

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    metadata: ObjectMetadata,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            get_calls: Arc::new(AtomicUsize::new(0)),
            chunk_size: DEFAULT_CHUNK_SIZE,
            latency: None,
        }
    }

    /// Split object bodies into chunks of at most `chunk_size` bytes
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Delay every call by `latency`, to simulate a slow store
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn create_bucket(&self, bucket: &str) {
        let mut buckets = self.buckets.write().await;
        buckets.entry(bucket.to_string()).or_default();
    }

    pub async fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) -> ObjectMetadata {
        self.put_object_at(bucket, key, data, Utc::now()).await
    }

    pub async fn put_object_at(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        last_modified: DateTime<Utc>,
    ) -> ObjectMetadata {
        let data = data.into();
        let metadata = ObjectMetadata {
            key: key.to_string(),
            size: data.len() as u64,
            etag: Self::calculate_etag(&data),
            last_modified,
            content_type: "binary/octet-stream".to_string(),
        };

        let mut buckets = self.buckets.write().await;
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                data,
                metadata: metadata.clone(),
            },
        );

        metadata
    }

    /// Number of `get_object` calls served so far
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn calculate_etag(data: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(data);
        format!("\"{}\"", hex::encode(hash))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn no_such_bucket(bucket: &str) -> BrowseError {
        BrowseError::NotFound(format!("bucket '{}' does not exist", bucket))
    }
}

#[async_trait::async_trait]
impl StorageBackend for InMemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<String>, BrowseError> {
        self.simulate_latency().await;
        let buckets = self.buckets.read().await;
        let mut names: Vec<String> = buckets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing, BrowseError> {
        self.simulate_latency().await;
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;

        let mut listing = ObjectListing::default();
        for (key, obj) in objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            match rest.find(delimiter).filter(|_| !delimiter.is_empty()) {
                Some(idx) => {
                    let folder = format!("{}{}", prefix, &rest[..idx + delimiter.len()]);
                    if listing.folders.last() != Some(&folder) {
                        listing.folders.push(folder);
                    }
                }
                None => listing.objects.push(obj.metadata.clone()),
            }
        }

        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, BrowseError> {
        self.simulate_latency().await;
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;

        objects
            .get(key)
            .map(|obj| obj.metadata.clone())
            .ok_or_else(|| BrowseError::NotFound(format!("key '{}' does not exist", key)))
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
        if_match: Option<&str>,
    ) -> Result<ObjectStream, BrowseError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let data = {
            let buckets = self.buckets.read().await;
            let objects = buckets.get(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;
            let obj = objects
                .get(key)
                .ok_or_else(|| BrowseError::NotFound(format!("key '{}' does not exist", key)))?;
            if let Some(etag) = if_match.filter(|etag| *etag != obj.metadata.etag) {
                return Err(BrowseError::Unavailable(format!(
                    "{} no longer matches etag {}",
                    key, etag
                )));
            }
            obj.data.clone()
        };

        let len = data.len() as u64;
        let data = match range {
            Some(range) => {
                if range.start >= len && len > 0 {
                    return Err(BrowseError::Unavailable(format!(
                        "range {} not satisfiable for {} bytes",
                        range, len
                    )));
                }
                let end = range.end.map_or(len, |end| (end + 1).min(len));
                data.slice(range.start.min(len) as usize..end as usize)
            }
            None => data,
        };

        // Hand out the body in several chunks, like a network read would
        let chunks: Vec<Result<Bytes, BrowseError>> = (0..data.len())
            .step_by(self.chunk_size)
            .map(|offset| Ok(data.slice(offset..(offset + self.chunk_size).min(data.len()))))
            .collect();

        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, BrowseError> {
        self.head_object(bucket, key).await?;

        let issued = Utc::now();
        Ok(format!(
            "memory://{}/{}?X-Amz-Date={}&X-Amz-Expires={}",
            bucket,
            key,
            issued.format("%Y%m%dT%H%M%SZ"),
            ttl.as_secs()
        ))
    }
}
