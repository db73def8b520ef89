use crate::types::{BrowseError, ObjectListing, ObjectMetadata};
use bytes::Bytes;
use futures::stream::Stream;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// Stream of object body chunks
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, BrowseError>> + Send>>;

/// Byte range of an object, `end` inclusive. An open `end` reads to the end of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn from_offset(start: u64) -> Self {
        Self { start, end: None }
    }

    pub fn inclusive(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }
}

/// Formats as an HTTP `Range` header value
impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "bytes={}-{}", self.start, end),
            None => write!(f, "bytes={}-", self.start),
        }
    }
}

/// Storage backend trait - implement this for different object stores
///
/// Implementations never retry internally: transient failures are reported as
/// [`BrowseError::Unavailable`] and the caller decides what to do.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>, BrowseError>;

    /// List the direct children of `prefix`, grouping deeper keys into common prefixes
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing, BrowseError>;

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, BrowseError>;

    /// Read `key`, or only `range` of it. With `if_match`, the read fails with
    /// [`BrowseError::Unavailable`] unless the stored etag still equals it.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
        if_match: Option<&str>,
    ) -> Result<ObjectStream, BrowseError>;

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, BrowseError>;
}
