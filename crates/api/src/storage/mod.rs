//! Blob storage for evidence files and export artifacts.
//!
//! Locations are relative keys such as `{organization_id}/{file}`; the
//! backend decides where the bytes live.

pub mod local;

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

pub use local::LocalStorage;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream over a stored blob.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under a new `key`, returning the location to persist.
    /// Existing blobs are never overwritten.
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<String>;

    /// Read a whole blob into memory.
    async fn get(&self, location: &str) -> StorageResult<Vec<u8>>;

    /// Open a blob for streaming.
    async fn open(&self, location: &str) -> StorageResult<(BlobReader, u64)>;

    async fn exists(&self, location: &str) -> StorageResult<bool>;

    /// Remove a blob. Removing a missing blob is not an error.
    async fn delete(&self, location: &str) -> StorageResult<()>;
}
