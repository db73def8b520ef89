mod helpers;

use bucketview::storage::{ByteRange, ObjectStream};
use bucketview::types::{ObjectListing, ObjectMetadata};
use bucketview::{BrowseError, BucketBrowser, InMemoryStorage, PreviewSettings, StorageBackend};
use helpers::{TEST_BUCKET, TestApp, csv_rows};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Store whose `head_object` can be frozen on an earlier version of an object,
/// so a write lands between the metadata check and the body read
struct FrozenHead {
    inner: InMemoryStorage,
    frozen: Mutex<Option<ObjectMetadata>>,
}

impl FrozenHead {
    fn freeze(&self, metadata: ObjectMetadata) {
        *self.frozen.lock().unwrap() = Some(metadata);
    }
}

#[async_trait::async_trait]
impl StorageBackend for FrozenHead {
    async fn list_buckets(&self) -> Result<Vec<String>, BrowseError> {
        self.inner.list_buckets().await
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing, BrowseError> {
        self.inner.list_objects(bucket, prefix, delimiter).await
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, BrowseError> {
        let frozen = self.frozen.lock().unwrap().clone();
        match frozen {
            Some(metadata) => Ok(metadata),
            None => self.inner.head_object(bucket, key).await,
        }
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
        if_match: Option<&str>,
    ) -> Result<ObjectStream, BrowseError> {
        self.inner.get_object(bucket, key, range, if_match).await
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, BrowseError> {
        self.inner.presigned_url(bucket, key, ttl).await
    }
}

/// Settings that page every object above 16 bytes through the row index
fn streaming_settings() -> PreviewSettings {
    PreviewSettings {
        streaming_threshold: Some(16),
        checkpoint_interval: 4,
        ..TestApp::test_settings()
    }
}

fn full_decode_settings() -> PreviewSettings {
    PreviewSettings {
        streaming_threshold: None,
        ..TestApp::test_settings()
    }
}

#[tokio::test]
async fn test_streaming_matches_full_decode() {
    let samples = [
        csv_rows(0, true),
        csv_rows(1, false),
        csv_rows(23, true),
        csv_rows(40, false),
        "\u{feff}id,name\r\n1,\"a,b\"\r\n\r\n3,ünïcødé\r\n4,x".to_string(),
        format!("{}\n\n\n", csv_rows(19, false)),
    ];

    for (i, body) in samples.iter().enumerate() {
        let key = format!("sample-{}.csv", i);
        let streamed = TestApp::with_settings(
            InMemoryStorage::new().with_chunk_size(7),
            streaming_settings(),
        );
        let decoded = TestApp::with_settings(InMemoryStorage::new(), full_decode_settings());
        streamed.storage.put_object(TEST_BUCKET, &key, body.clone()).await;
        decoded.storage.put_object(TEST_BUCKET, &key, body.clone()).await;

        for page_size in [1, 3, 4, 10] {
            let first = decoded
                .browser
                .preview_page(TEST_BUCKET, &key, Some(page_size), 1)
                .await
                .unwrap();

            for page in 1..=first.max_page {
                let expected = decoded
                    .browser
                    .preview_page(TEST_BUCKET, &key, Some(page_size), page)
                    .await
                    .unwrap();
                let actual = streamed
                    .browser
                    .preview_page(TEST_BUCKET, &key, Some(page_size), page)
                    .await
                    .unwrap();
                assert_eq!(actual, expected, "{} page {} of size {}", key, page, page_size);
            }

            let beyond = streamed
                .browser
                .preview_page(TEST_BUCKET, &key, Some(page_size), first.max_page + 1)
                .await;
            assert!(matches!(beyond, Err(BrowseError::InvalidPage { .. })));
        }
    }
}

#[tokio::test]
async fn test_row_index_is_reused_until_object_changes() {
    let app = TestApp::with_settings(InMemoryStorage::new(), streaming_settings());
    app.storage
        .put_object(TEST_BUCKET, "data.csv", csv_rows(30, true))
        .await;

    app.browser
        .preview_page(TEST_BUCKET, "data.csv", Some(10), 1)
        .await
        .unwrap();
    // One scan for the index, one ranged read for the page
    assert_eq!(app.storage.get_calls(), 2);

    let page = app
        .browser
        .preview_page(TEST_BUCKET, "data.csv", Some(10), 3)
        .await
        .unwrap();
    assert_eq!(app.storage.get_calls(), 3);
    assert_eq!(page.start_row_index, 21);
    assert_eq!(page.total_rows, 30);

    app.storage
        .put_object(TEST_BUCKET, "data.csv", csv_rows(45, true))
        .await;

    let page = app
        .browser
        .preview_page(TEST_BUCKET, "data.csv", Some(10), 5)
        .await
        .unwrap();
    assert_eq!(app.storage.get_calls(), 5);
    assert_eq!(page.total_rows, 45);
    assert_eq!(page.start_row_index, 41);
    assert_eq!(page.end_row_index, 45);
    assert_eq!(page.data_rows().len(), 5);
}

#[tokio::test]
async fn test_empty_window_skips_ranged_read() {
    let app = TestApp::with_settings(InMemoryStorage::new(), streaming_settings());
    app.storage
        .put_object(TEST_BUCKET, "even.csv", csv_rows(20, true))
        .await;

    let page = app
        .browser
        .preview_page(TEST_BUCKET, "even.csv", Some(10), 3)
        .await
        .unwrap();
    assert_eq!(page.data_rows().len(), 0);
    assert_eq!(page.start_row_index, 21);
    assert_eq!(page.end_row_index, 20);
    assert_eq!(app.storage.get_calls(), 1);
}

#[tokio::test]
async fn test_invalid_encoding_fails_in_streaming_too() {
    let app = TestApp::with_settings(InMemoryStorage::new(), streaming_settings());
    let mut body = csv_rows(20, true).into_bytes();
    body.extend_from_slice(b"21,caf\xe9\n");
    app.storage.put_object(TEST_BUCKET, "latin1.csv", body).await;

    let result = app
        .browser
        .preview_page(TEST_BUCKET, "latin1.csv", Some(10), 1)
        .await;
    assert!(matches!(result, Err(BrowseError::DecodeError(_))));
}

#[tokio::test]
async fn test_slow_store_is_unavailable() {
    let storage = InMemoryStorage::new().with_latency(Duration::from_millis(300));
    let app = TestApp::with_timeout(
        storage,
        TestApp::test_settings(),
        Duration::from_millis(30),
    );
    app.storage
        .put_object(TEST_BUCKET, "data.csv", csv_rows(3, true))
        .await;

    let result = app
        .browser
        .preview_page(TEST_BUCKET, "data.csv", Some(10), 1)
        .await;
    assert!(matches!(result, Err(BrowseError::Unavailable(_))));
}

#[tokio::test]
async fn test_object_replaced_after_head_is_unavailable() {
    let storage = InMemoryStorage::new().with_chunk_size(5);
    let original = storage
        .put_object(TEST_BUCKET, "data.csv", csv_rows(20, true))
        .await;

    let backend = Arc::new(FrozenHead {
        inner: storage.clone(),
        frozen: Mutex::new(None),
    });
    let browser = BucketBrowser::new(
        Arc::clone(&backend) as Arc<dyn StorageBackend>,
        streaming_settings(),
        Duration::from_secs(3600),
    );

    let page = browser
        .preview_page(TEST_BUCKET, "data.csv", Some(4), 1)
        .await
        .unwrap();
    assert_eq!(page.data_rows()[0], vec!["1", "row-1"]);

    // Same size, different bytes: the cached checkpoints would still line up
    backend.freeze(original);
    let same_size = csv_rows(20, true).replace("row-", "ROW-");
    storage.put_object(TEST_BUCKET, "data.csv", same_size).await;

    let result = browser
        .preview_page(TEST_BUCKET, "data.csv", Some(4), 3)
        .await;
    assert!(
        matches!(result, Err(BrowseError::Unavailable(_))),
        "expected Unavailable, got {:?}",
        result
    );

    // Shorter: the cached checkpoints point past the end
    storage.put_object(TEST_BUCKET, "data.csv", csv_rows(2, true)).await;
    let result = browser
        .preview_page(TEST_BUCKET, "data.csv", Some(4), 5)
        .await;
    assert!(matches!(result, Err(BrowseError::Unavailable(_))));

    // Once the new version is visible the index is rebuilt
    *backend.frozen.lock().unwrap() = None;
    let page = browser
        .preview_page(TEST_BUCKET, "data.csv", Some(4), 1)
        .await
        .unwrap();
    assert_eq!(page.total_rows, 2);
    assert_eq!(page.data_rows()[0], vec!["1", "row-1"]);
}
