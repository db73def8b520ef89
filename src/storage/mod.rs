mod backend;
mod in_memory;
mod s3;
mod timeout;

pub use backend::{ByteRange, ObjectStream, StorageBackend};
pub use in_memory::InMemoryStorage;
pub use s3::S3Backend;
pub use timeout::TimeoutBackend;
