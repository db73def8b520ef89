use super::backend::{ByteRange, ObjectStream, StorageBackend};
use crate::types::{BrowseError, ObjectListing, ObjectMetadata};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Wraps a backend so every store call, and every chunk of a streamed body,
/// fails with `Unavailable` once `timeout` elapses. Nothing is retried.
pub struct TimeoutBackend {
    inner: Arc<dyn StorageBackend>,
    timeout: Duration,
}

impl TimeoutBackend {
    pub fn new(inner: Arc<dyn StorageBackend>, timeout: Duration) -> Self {
        tracing::info!("Store calls bounded to {:?}", timeout);
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &str, future: F) -> Result<T, BrowseError>
    where
        F: Future<Output = Result<T, BrowseError>>,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", operation, self.timeout);
                Err(BrowseError::Unavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for TimeoutBackend {
    async fn list_buckets(&self) -> Result<Vec<String>, BrowseError> {
        self.bounded("list buckets", self.inner.list_buckets()).await
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing, BrowseError> {
        self.bounded(
            "list objects",
            self.inner.list_objects(bucket, prefix, delimiter),
        )
        .await
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, BrowseError> {
        self.bounded("head object", self.inner.head_object(bucket, key))
            .await
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
        if_match: Option<&str>,
    ) -> Result<ObjectStream, BrowseError> {
        let body = self
            .bounded(
                "get object",
                self.inner.get_object(bucket, key, range, if_match),
            )
            .await?;

        let timeout = self.timeout;
        let chunks = tokio_stream::StreamExt::timeout(body, timeout).map(move |chunk| {
            chunk.unwrap_or_else(|_| {
                Err(BrowseError::Unavailable(format!(
                    "object body read timed out after {:?}",
                    timeout
                )))
            })
        });

        Ok(Box::pin(chunks))
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, BrowseError> {
        self.bounded(
            "presign object",
            self.inner.presigned_url(bucket, key, ttl),
        )
        .await
    }
}
