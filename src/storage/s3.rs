use crate::storage::backend::{ByteRange, ObjectStream, StorageBackend};
use crate::types::{BrowseError, ObjectListing, ObjectMetadata};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use futures::stream;
use std::time::Duration;

pub struct S3Backend {
    client: S3Client,
    name: String,
}

impl S3Backend {
    /// Helper function to extract metadata from AWS SDK response
    fn extract_metadata(
        key: &str,
        content_length: Option<i64>,
        etag: Option<&str>,
        last_modified: Option<&aws_sdk_s3::primitives::DateTime>,
        content_type: Option<&str>,
    ) -> ObjectMetadata {
        let size = content_length.unwrap_or(0).max(0) as u64;
        let etag = etag.map(|s| s.to_string()).unwrap_or_default();
        let last_modified = last_modified
            .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
            .unwrap_or_default();
        let content_type = content_type
            .map(|s| s.to_string())
            .unwrap_or_else(|| "binary/octet-stream".to_string());

        ObjectMetadata {
            key: key.to_string(),
            size,
            etag,
            last_modified,
            content_type,
        }
    }

    pub async fn new(
        name: String,
        region: String,
        endpoint: Option<String>,
        force_path_style: bool,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            // Transient failures surface to the caller as Unavailable
            .retry_config(aws_config::retry::RetryConfig::disabled());

        // Set credentials if provided
        if let (Some(key_id), Some(secret_key)) = (access_key_id, secret_access_key) {
            config_loader = config_loader.credentials_provider(
                aws_sdk_s3::config::Credentials::new(key_id, secret_key, None, None, "static"),
            );
        }

        let config = config_loader.load().await;

        let mut s3_config_builder =
            aws_sdk_s3::config::Builder::from(&config).force_path_style(force_path_style);

        // Set custom endpoint if provided
        if let Some(endpoint_url) = endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        let s3_config = s3_config_builder.build();
        let client = S3Client::from_conf(s3_config);

        Ok(Self { client, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Map an SDK failure onto the browse error taxonomy, logging it
    fn classify<E>(&self, context: &str, err: SdkError<E, HttpResponse>) -> BrowseError
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let error = classify_sdk_error(context, &err);
        tracing::warn!("[{}] {}", self.name, error);
        error
    }

    /// Adapt an SDK body into the chunk stream used by the preview engine
    fn body_stream(&self, body: ByteStream) -> ObjectStream {
        let name = self.name.clone();
        Box::pin(stream::unfold(body, move |mut body| {
            let name = name.clone();
            async move {
                let chunk = body.next().await?.map_err(|e| {
                    tracing::error!("[{}] Failed to read object chunk: {}", name, e);
                    BrowseError::Unavailable(format!("failed to read object body: {}", e))
                });
                Some((chunk, body))
            }
        }))
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    async fn list_buckets(&self) -> Result<Vec<String>, BrowseError> {
        tracing::debug!("[{}] Listing buckets", self.name);

        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| self.classify("list buckets", err))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing, BrowseError> {
        tracing::debug!(
            "[{}] Listing objects: bucket={}, prefix={:?}",
            self.name,
            bucket,
            prefix
        );

        let mut listing = ObjectListing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter(delimiter);

            if let Some(token) = continuation_token.as_deref() {
                request = request.continuation_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|err| self.classify("list objects", err))?;

            listing.folders.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string)),
            );
            listing
                .objects
                .extend(output.contents().iter().filter_map(|obj| {
                    let key = obj.key()?;
                    Some(Self::extract_metadata(
                        key,
                        obj.size(),
                        obj.e_tag(),
                        obj.last_modified(),
                        None,
                    ))
                }));

            if output.is_truncated().unwrap_or(false) {
                continuation_token = output.next_continuation_token().map(str::to_string);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        tracing::debug!(
            "[{}] Found {} folders and {} objects",
            self.name,
            listing.folders.len(),
            listing.objects.len()
        );
        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, BrowseError> {
        tracing::debug!("[{}] Getting metadata for object: {}", self.name, key);

        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| self.classify("head object", err))?;

        Ok(Self::extract_metadata(
            key,
            output.content_length(),
            output.e_tag(),
            output.last_modified(),
            output.content_type(),
        ))
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
        if_match: Option<&str>,
    ) -> Result<ObjectStream, BrowseError> {
        tracing::debug!(
            "[{}] Getting object: {} (range: {:?})",
            self.name,
            key,
            range.map(|r| r.to_string())
        );

        let mut request = self.client.get_object().bucket(bucket).key(key);
        if let Some(range) = range {
            request = request.range(range.to_string());
        }
        if let Some(etag) = if_match {
            request = request.if_match(etag);
        }

        let output = request
            .send()
            .await
            .map_err(|err| self.classify("get object", err))?;

        Ok(self.body_stream(output.body))
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, BrowseError> {
        tracing::debug!("[{}] Presigning {} for {:?}", self.name, key, ttl);

        let config = PresigningConfig::expires_in(ttl)
            .map_err(|err| BrowseError::InvalidRequest(format!("invalid presign ttl: {}", err)))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| self.classify("presign object", err))?;

        Ok(presigned.uri().to_string())
    }
}

fn classify_sdk_error<E>(context: &str, err: &SdkError<E, HttpResponse>) -> BrowseError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = format!("{}: {}", context, DisplayErrorContext(err));

    if matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
    ) {
        return BrowseError::Unavailable(message);
    }

    let status = err.raw_response().map(|response| response.status().as_u16());
    match (err.code(), status) {
        (Some("NoSuchKey" | "NoSuchBucket" | "NotFound"), _) | (_, Some(404)) => {
            BrowseError::NotFound(message)
        }
        (
            Some("AccessDenied" | "Forbidden" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"),
            _,
        )
        | (_, Some(401 | 403)) => BrowseError::AccessDenied(message),
        // The object changed under a conditional or ranged read
        (Some("PreconditionFailed" | "InvalidRange"), _) | (_, Some(412 | 416)) => {
            BrowseError::Unavailable(message)
        }
        (Some("SlowDown" | "ServiceUnavailable" | "RequestTimeout"), _) => {
            BrowseError::Unavailable(message)
        }
        (_, Some(status)) if status == 429 || status >= 500 => BrowseError::Unavailable(message),
        _ => BrowseError::Internal(message),
    }
}
