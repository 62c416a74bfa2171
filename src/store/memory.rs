//! In-memory `ObjectStore` used by unit and router tests.

use super::{ObjectStore, RawObjectEntry, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const MEMORY_BUCKET: &str = "assets";

pub struct MemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, (Bytes, DateTime<Utc>)>>,
    listing: Mutex<Option<Vec<RawObjectEntry>>>,
    failure: Mutex<Option<StoreError>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::for_bucket(MEMORY_BUCKET)
    }

    pub fn for_bucket(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(BTreeMap::new()),
            listing: Mutex::new(None),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `entries` verbatim from `list_all` instead of the stored objects.
    pub fn with_listing(entries: Vec<RawObjectEntry>) -> Self {
        let store = Self::new();
        *store.listing.lock().unwrap() = Some(entries);
        store
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn insert(&self, key: &str, body: &'static [u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (Bytes::from_static(body), Utc::now()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn body(&self, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(body, _)| body.clone())
    }

    /// Number of store calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_all(&self) -> StoreResult<Vec<RawObjectEntry>> {
        self.enter()?;
        if let Some(entries) = self.listing.lock().unwrap().clone() {
            return Ok(entries);
        }

        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .map(|(key, (body, modified))| RawObjectEntry {
                key: Some(key.clone()),
                last_modified: Some(*modified),
                etag: Some(format!("\"{:x}\"", body.len())),
                size: Some(body.len() as i64),
                storage_class: Some("STANDARD".into()),
            })
            .collect())
    }

    async fn put(&self, key: &str, body: Bytes) -> StoreResult<()> {
        self.enter()?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, Utc::now()));
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.enter()?;
        self.body(key)
            .ok_or_else(|| StoreError::not_found(format!("NoSuchKey: {key}")))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.enter()?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn check_bucket(&self) -> StoreResult<()> {
        self.enter()
    }
}
