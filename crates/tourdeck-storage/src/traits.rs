//! Storage abstraction trait
//!
//! All storage backends (S3, local filesystem, in-memory) implement this
//! trait so the derivative pipeline can run against any of them.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tourdeck_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Writes carry an explicit content type and land as private objects.
/// Presigned URL issuance never checks that the key exists; a dangling link
/// simply fails when dereferenced.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key` with the declared content type.
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Fetch the full object bytes for `key`.
    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Check whether an object exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Generate a time-limited retrieval URL for `key`.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// The backend type behind this instance.
    fn backend_type(&self) -> StorageBackend;
}
