mod test_app;

#[allow(unused_imports)]
pub use test_app::{TestApp, csv_rows};

pub const TEST_BUCKET: &str = "test-bucket";
