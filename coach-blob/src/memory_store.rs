use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{BlobError, BlobResult, BlobStore, PutResult};

/// In-process blob store.
///
/// Counts every call so callers can assert a code path never touched storage.
pub struct MemoryBlobStore {
    bucket: String,
    objects: RwLock<HashMap<String, Bytes>>,
    calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn location(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, _content_type: Option<&str>, data: Bytes) -> BlobResult<PutResult> {
        self.record_call();
        if key.is_empty() {
            return Err(BlobError::invalid("blob key must not be empty"));
        }
        let size_bytes = data.len() as u64;
        self.objects.write().await.insert(key.to_string(), data);
        Ok(PutResult {
            location: self.location(key),
            etag: None,
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        self.record_call();
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::not_found(key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.record_call();
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        self.record_call();
        Ok(self.objects.read().await.contains_key(key))
    }
}
