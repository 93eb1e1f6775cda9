use async_trait::async_trait;
use bytes::Bytes;

use crate::BlobResult;

/// Core blob storage operations - implemented by every storage backend
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, content_type: Option<&str>, data: Bytes) -> BlobResult<PutResult>;

    /// Read the whole blob. Missing keys fail with `BlobError::NotFound`.
    async fn get(&self, key: &str) -> BlobResult<Bytes>;

    /// Delete a blob. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> BlobResult<()>;

    async fn exists(&self, key: &str) -> BlobResult<bool>;
}

/// Result of a successful put operation
#[derive(Debug, Clone, PartialEq)]
pub struct PutResult {
    /// Where readers fetch the blob from; stored as the coach photo.
    pub location: String,
    pub etag: Option<String>,
    pub size_bytes: u64,
}
