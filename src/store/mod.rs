//! Store client adapter.
//!
//! Every storage operation reaches the external object store through the
//! [`ObjectStore`] trait. Implementations translate their native failures
//! into a single [`StoreError`] so nothing store-specific leaks upward.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod s3;

pub use s3::{S3Store, StoreSettings};

/// One entry of a bucket listing, exactly as the store reported it.
///
/// Fields stay optional here; `ObjectRecord::parse` decides which
/// combinations are acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObjectEntry {
    pub key: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub size: Option<i64>,
    pub storage_class: Option<String>,
}

/// Any failure coming from the store or its transport.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    /// Set when the store reported a missing key or bucket.
    pub not_found: bool,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: true,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The four native verbs of an S3-compatible store.
///
/// Each implementation is bound to one bucket when it is built; every call
/// addresses that bucket. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store was bound to at construction.
    fn bucket(&self) -> &str;

    /// Every entry in the bucket, following continuation tokens to the end.
    async fn list_all(&self) -> StoreResult<Vec<RawObjectEntry>>;

    async fn put(&self, key: &str, body: Bytes) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Cheap reachability check used by `/readyz`.
    async fn check_bucket(&self) -> StoreResult<()>;
}
