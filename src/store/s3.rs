//! `ObjectStore` backed by an S3-compatible endpoint (R2, MinIO, AWS).

use super::{ObjectStore, RawObjectEntry, StoreError, StoreResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::{
        get_object::GetObjectError, head_bucket::HeadBucketError,
        list_objects_v2::ListObjectsV2Error,
    },
    primitives::ByteStream,
    types::Object,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tracing::debug;

/// Connection parameters for [`S3Store`]. Immutable once the store is built.
#[derive(Clone)]
pub struct StoreSettings {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
    pub force_path_style: bool,
}

/// Thin wrapper over the SDK client, bound to one bucket. Cloning shares the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build an SDK client using static credentials and an explicit endpoint.
    pub async fn connect(settings: &StoreSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "object-gateway",
        );

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(settings.endpoint_url.clone())
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(settings.force_path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_all(&self) -> StoreResult<Vec<RawObjectEntry>> {
        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }

            let page = req
                .send()
                .await
                .map_err(|err| list_error(&self.bucket, err))?;

            entries.extend(page.contents().iter().map(raw_entry));
            debug!(bucket = %self.bucket, fetched = entries.len(), "listed page");

            continuation_token = page.next_continuation_token().map(str::to_string);
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(entries)
    }

    async fn put(&self, key: &str, body: Bytes) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| sdk_error(format!("failed to put {key}"), err, false))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| get_error(key, err))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::new(format!("failed to read body of {key}: {err}")))?;

        Ok(body.into_bytes())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| sdk_error(format!("failed to delete {key}"), err, false))?;

        Ok(())
    }

    async fn check_bucket(&self) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| head_bucket_error(&self.bucket, err))?;

        Ok(())
    }
}

fn list_error<R: Debug>(bucket: &str, err: SdkError<ListObjectsV2Error, R>) -> StoreError {
    let not_found = err
        .as_service_error()
        .is_some_and(|svc| svc.is_no_such_bucket());
    sdk_error(format!("failed to list bucket {bucket}"), err, not_found)
}

fn get_error<R: Debug>(key: &str, err: SdkError<GetObjectError, R>) -> StoreError {
    let not_found = err
        .as_service_error()
        .is_some_and(|svc| svc.is_no_such_key());
    sdk_error(format!("failed to get {key}"), err, not_found)
}

fn head_bucket_error<R: Debug>(bucket: &str, err: SdkError<HeadBucketError, R>) -> StoreError {
    let not_found = err
        .as_service_error()
        .is_some_and(|svc| svc.is_not_found());
    sdk_error(format!("failed to reach bucket {bucket}"), err, not_found)
}

/// Flatten an SDK failure into a `StoreError`, keeping the store's error
/// code when one was returned.
fn sdk_error<E, R>(context: String, err: SdkError<E, R>, not_found: bool) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let message = match err.code() {
        Some(code) => format!("{context}: {code}: {}", DisplayErrorContext(&err)),
        None => format!("{context}: {}", DisplayErrorContext(&err)),
    };
    if not_found {
        StoreError::not_found(message)
    } else {
        StoreError::new(message)
    }
}

fn raw_entry(object: &Object) -> RawObjectEntry {
    RawObjectEntry {
        key: object.key().map(str::to_string),
        last_modified: object
            .last_modified()
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())),
        etag: object.e_tag().map(str::to_string),
        size: object.size(),
        storage_class: object.storage_class().map(|class| class.as_str().to_string()),
    }
}
