// Library exports for integration tests
pub mod app_state;
pub mod browser;
pub mod config;
pub mod handlers;
pub mod listing;
pub mod preview;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use app_state::AppState;
pub use browser::BucketBrowser;
pub use config::{BackendConfig, Config};
pub use preview::{PageSizeLimits, PreviewSettings};
pub use session::{BrowsingSession, PreviewSession};
pub use storage::{InMemoryStorage, S3Backend, StorageBackend, TimeoutBackend};
pub use types::{BrowseError, DownloadLink, ListingRequest, ObjectEntry, Page, PathListing, SortKey};

// Re-export server creation function
pub use server::create_app;
