mod helpers;

use axum::http::StatusCode;
use bucketview::{InMemoryStorage, PreviewSettings};
use helpers::{TEST_BUCKET, TestApp, csv_rows};

#[tokio::test]
async fn test_preview_over_http() {
    let app = TestApp::start();
    app.storage
        .put_object(TEST_BUCKET, "a/b.csv", csv_rows(12, true))
        .await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=a/b.csv&page_size=10&page=2")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "a/b.csv");
    assert_eq!(body["start_row_index"], 11);
    assert_eq!(body["end_row_index"], 12);
    assert_eq!(body["total_rows"], 12);
    assert_eq!(body["max_page"], 2);
    assert_eq!(body["summary"], "Showing rows 11 to 12 of 12");
    assert_eq!(
        body["rows"],
        serde_json::json!([["id", "name"], ["11", "row-11"], ["12", "row-12"]])
    );
}

#[tokio::test]
async fn test_preview_defaults_to_first_page() {
    let app = TestApp::start();
    app.storage
        .put_object(TEST_BUCKET, "a/b.csv", csv_rows(12, true))
        .await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=a/b.csv")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["rows"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_invalid_page_over_http() {
    let app = TestApp::start();
    app.storage
        .put_object(TEST_BUCKET, "a/b.csv", csv_rows(12, true))
        .await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=a/b.csv&page_size=10&page=3")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidPage");
    assert_eq!(body["max_page"], 2);
}

#[tokio::test]
async fn test_too_large_over_http() {
    let settings = PreviewSettings {
        max_preview_size: 10,
        ..TestApp::test_settings()
    };
    let app = TestApp::with_settings(InMemoryStorage::new(), settings);
    app.storage
        .put_object(TEST_BUCKET, "a/b.csv", csv_rows(12, true))
        .await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=a/b.csv")
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "TooLarge");
    assert_eq!(body["limit"], 10);
    assert_eq!(app.storage.get_calls(), 0);
}

#[tokio::test]
async fn test_decode_error_over_http() {
    let app = TestApp::start();
    app.storage
        .put_object(TEST_BUCKET, "bin.csv", vec![0xff, 0xfe, b'\n'])
        .await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=bin.csv")
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "DecodeError");
}

#[tokio::test]
async fn test_missing_object_over_http() {
    let app = TestApp::start();
    app.storage.create_bucket(TEST_BUCKET).await;

    let (status, body) = app
        .get("/api/buckets/test-bucket/preview?key=nope.csv")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}
