pub mod error;
mod models;

pub use error::BrowseError;
pub use models::{
    DownloadLink, ListingRequest, ObjectEntry, ObjectListing, ObjectMetadata, ObjectVersion, Page,
    PathListing, SortKey,
};
