//! src/services/storage_service.rs
//!
//! StorageService — the four bucket operations (list, upload, download,
//! delete) built on the `ObjectStore` adapter. Nothing here knows about HTTP;
//! handlers translate `StorageError` into responses.

use crate::{
    models::object::{MalformedEntryError, ObjectRecord},
    store::{ObjectStore, StoreError},
};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    MalformedEntry(#[from] MalformedEntryError),
    #[error("object key must not be empty")]
    InvalidKey,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// StorageService provides the gateway's storage operations against a single
/// bucket:
/// - List objects (every entry, normalized into `ObjectRecord`s)
/// - Upload an object (last writer wins, no existence check)
/// - Download an object (whole body, no ranges)
/// - Delete an object (idempotent)
///
/// Cloning is cheap; the store handle is shared and nothing is mutated after
/// construction.
#[derive(Clone)]
pub struct StorageService {
    /// Adapter every operation goes through, already bound to its bucket.
    pub store: Arc<dyn ObjectStore>,

    /// Base of the public object URLs reported by listings.
    pub public_url: String,
}

impl StorageService {
    pub fn new(store: Arc<dyn ObjectStore>, public_url: impl Into<String>) -> Self {
        Self {
            store,
            public_url: public_url.into(),
        }
    }

    /// Bucket the underlying store was bound to.
    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    /// List every object in the bucket.
    ///
    /// An empty bucket yields an empty vector. A single malformed entry fails
    /// the whole call; partial listings are never returned.
    pub async fn list_objects(&self) -> StorageResult<Vec<ObjectRecord>> {
        let entries = self.store.list_all().await?;
        let records = entries
            .into_iter()
            .map(ObjectRecord::parse)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(bucket = %self.bucket(), count = records.len(), "listed objects");
        Ok(records)
    }

    /// Upload `payload`, returning the key it was stored under.
    ///
    /// See [`resolve_object_key`] for how the key is chosen. An existing
    /// object under the same key is overwritten.
    pub async fn upload_object(
        &self,
        requested_key: Option<&str>,
        filename: Option<&str>,
        payload: Bytes,
    ) -> StorageResult<String> {
        let key = resolve_object_key(requested_key, filename)?;
        let size = payload.len();

        self.store.put(&key, payload).await?;

        info!(bucket = %self.bucket(), key = %key, size, "uploaded object");
        Ok(key)
    }

    /// Fetch the full body of `key`.
    pub async fn download_object(&self, key: &str) -> StorageResult<Bytes> {
        ensure_key(key)?;
        let body = self.store.get(key).await?;

        debug!(bucket = %self.bucket(), key, size = body.len(), "downloaded object");
        Ok(body)
    }

    /// Delete `key`. Deleting a key that does not exist succeeds.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        ensure_key(key)?;
        self.store.delete(key).await?;

        info!(bucket = %self.bucket(), key, "deleted object");
        Ok(())
    }

    /// Check the bucket is reachable, for the readiness endpoint.
    pub async fn check_ready(&self) -> StorageResult<()> {
        self.store.check_bucket().await?;
        Ok(())
    }
}

/// Choose the key an upload is stored under.
///
/// An explicitly requested key wins. A missing or empty request falls back to
/// the name the client attached to the uploaded file. Fails with
/// `InvalidKey` when neither yields a non-empty key.
pub fn resolve_object_key(
    requested_key: Option<&str>,
    filename: Option<&str>,
) -> StorageResult<String> {
    let key = requested_key
        .filter(|key| !key.is_empty())
        .or(filename)
        .unwrap_or_default();
    ensure_key(key)?;
    Ok(key.to_string())
}

fn ensure_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey);
    }
    Ok(())
}
