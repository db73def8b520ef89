mod download_link;
mod list_buckets;
mod list_path;
mod not_found;
mod preview_page;

pub use download_link::download_link;
pub use list_buckets::list_buckets;
pub use list_path::list_path;
pub use not_found::not_found;
pub use preview_page::preview_page;
