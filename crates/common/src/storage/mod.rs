//! Object storage backend abstraction (S3/MinIO/local filesystem/memory).

mod config;
mod error;
mod store;

pub use config::StorageConfig;
pub use error::{Result, StorageError};
pub use store::{BlobMeta, ByteStream, Storage};
