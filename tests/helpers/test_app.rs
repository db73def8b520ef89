use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bucketview::{
    AppState, BucketBrowser, InMemoryStorage, PageSizeLimits, PreviewSettings, StorageBackend,
    TimeoutBackend, create_app,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// In-process application over an in-memory store
///
/// Requests go through the actual production router from create_app(),
/// without binding a socket.
pub struct TestApp {
    pub storage: InMemoryStorage,
    pub browser: Arc<BucketBrowser>,
    router: Router,
}

#[allow(dead_code)]
impl TestApp {
    /// Small page sizes so tests can page through a handful of rows
    pub fn test_settings() -> PreviewSettings {
        PreviewSettings {
            default_page_size: 10,
            page_size_limits: PageSizeLimits { min: 1, max: 1_000 },
            ..Default::default()
        }
    }

    pub fn start() -> Self {
        Self::with_settings(InMemoryStorage::new(), Self::test_settings())
    }

    pub fn with_settings(storage: InMemoryStorage, settings: PreviewSettings) -> Self {
        Self::with_timeout(storage, settings, Duration::from_secs(5))
    }

    pub fn with_timeout(
        storage: InMemoryStorage,
        settings: PreviewSettings,
        timeout: Duration,
    ) -> Self {
        let backend: Arc<dyn StorageBackend> = Arc::new(storage.clone());
        let bounded: Arc<dyn StorageBackend> = Arc::new(TimeoutBackend::new(backend, timeout));

        let app_state = AppState::new(BucketBrowser::new(
            bounded,
            settings,
            Duration::from_secs(3600),
        ));
        let browser = Arc::clone(&app_state.browser);

        // Use the ACTUAL production create_app function
        let router = create_app(app_state);

        TestApp {
            storage,
            browser,
            router,
        }
    }

    /// Issue a GET and decode the JSON body
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

/// A CSV body with a header and `rows` numbered data rows
pub fn csv_rows(rows: usize, trailing_newline: bool) -> String {
    let mut body = String::from("id,name");
    for i in 1..=rows {
        body.push_str(&format!("\n{},row-{}", i, i));
    }
    if trailing_newline {
        body.push('\n');
    }
    body
}
