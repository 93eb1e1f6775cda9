//! # coach-blob: photo storage for the coach service
//!
//! A small key-addressed object store abstraction with two backends:
//!
//! - [`S3CompatibleStore`]: any S3-compatible endpoint (AWS, LocalStack, RustFS, MinIO)
//! - [`MemoryBlobStore`]: in-process map, used for tests and local runs
//!
//! Keys live under a logical prefix (`coach/<id>`); [`PhotoKeys`] builds them
//! and turns a stored photo location back into its key.
//!
//! ```rust
//! use coach_blob::{BlobStore, MemoryBlobStore, PhotoKeys};
//!
//! # #[tokio::main]
//! # async fn main() -> coach_blob::BlobResult<()> {
//! let store = MemoryBlobStore::new("photos");
//! let keys = PhotoKeys::default();
//!
//! let key = keys.fresh_key();
//! let put = store.put(&key, Some("image/png"), bytes::Bytes::from_static(b"png")).await?;
//!
//! assert_eq!(keys.key_from_reference(&put.location)?, key);
//! assert!(store.exists(&key).await?);
//! # Ok(())
//! # }
//! ```

mod error;
mod keys;
mod memory_store;
mod s3_store;
pub mod store;

pub use error::{BlobError, BlobResult};
pub use keys::{PhotoKeys, DEFAULT_KEY_PREFIX};
pub use memory_store::MemoryBlobStore;
pub use s3_store::{S3CompatibleStore, S3Config};
pub use store::{BlobStore, PutResult};
