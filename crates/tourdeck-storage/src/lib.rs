//! Tourdeck storage library
//!
//! Storage abstraction and backends for attachment objects. Objects are
//! private; reads happen only through time-limited presigned URLs issued by
//! [`Storage::presigned_get_url`].
//!
//! # Key format
//!
//! Keys are caller-namespaced: `{prefix}/{random-token}{ext}` for originals
//! and `{prefix}/{random-token}_thumb.jpg` for thumbnails. Key construction
//! lives in the pipeline crate; backends treat keys as opaque apart from
//! traversal validation in the local backend.

pub mod factory;
pub mod local;
pub mod memory;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use s3::S3Storage;
pub use tourdeck_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
