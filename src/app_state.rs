use crate::browser::BucketBrowser;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub browser: Arc<BucketBrowser>,
}

impl AppState {
    pub fn new(browser: BucketBrowser) -> Self {
        Self {
            browser: Arc::new(browser),
        }
    }
}
