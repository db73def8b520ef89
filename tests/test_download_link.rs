mod helpers;

use axum::http::StatusCode;
use bucketview::BrowseError;
use chrono::Utc;
use helpers::{TEST_BUCKET, TestApp};
use std::time::Duration;

#[tokio::test]
async fn test_download_link_expires_after_ttl() {
    let app = TestApp::start();
    app.storage.put_object(TEST_BUCKET, "a/b.csv", "id\n1\n").await;

    let before = Utc::now();
    let link = app
        .browser
        .download_link(TEST_BUCKET, "a/b.csv", Some(Duration::from_secs(600)))
        .await
        .unwrap();
    let after = Utc::now();

    assert!(link.url.contains("X-Amz-Expires=600"));
    assert!(link.expires_at >= before + chrono::Duration::seconds(600));
    assert!(link.expires_at <= after + chrono::Duration::seconds(600));
}

#[tokio::test]
async fn test_download_link_uses_default_ttl() {
    let app = TestApp::start();
    app.storage.put_object(TEST_BUCKET, "a/b.csv", "id\n").await;

    let link = app
        .browser
        .download_link(TEST_BUCKET, "a/b.csv", None)
        .await
        .unwrap();
    assert!(link.url.contains("X-Amz-Expires=3600"));
}

#[tokio::test]
async fn test_download_link_rejects_bad_ttl() {
    let app = TestApp::start();
    app.storage.put_object(TEST_BUCKET, "a/b.csv", "id\n").await;

    for ttl in [0, 604_801] {
        let result = app
            .browser
            .download_link(TEST_BUCKET, "a/b.csv", Some(Duration::from_secs(ttl)))
            .await;
        assert!(matches!(result, Err(BrowseError::InvalidRequest(_))));
    }
}

#[tokio::test]
async fn test_download_link_over_http() {
    let app = TestApp::start();
    app.storage.put_object(TEST_BUCKET, "a/b.csv", "id\n").await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/download?key=a/b.csv&ttl=60")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "a/b.csv");
    assert!(body["url"].as_str().unwrap().starts_with("memory://test-bucket/a/b.csv"));
    assert!(body["expires_at"].as_str().is_some());

    let (status, body) = app
        .get("/api/buckets/test-bucket/download?key=missing.csv")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}
