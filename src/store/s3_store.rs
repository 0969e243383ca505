use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::DateTimeFormat;
use aws_sdk_s3::Client;

use super::{BlobStore, StoredObject};
use crate::error::StoreError;

/// S3-backed implementation of `BlobStore`.
///
/// Reads whole objects from S3 or an S3-compatible service (MinIO, or Google
/// Cloud Storage through its XML interoperability endpoint). The filename is
/// used verbatim as the object key within the bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    identifier: String,
}

impl S3BlobStore {
    /// Create a new S3BlobStore for the given bucket.
    ///
    /// # Arguments
    /// * `client` - AWS S3 client to use for requests
    /// * `bucket` - Bucket name holding the served objects
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let identifier = format!("s3://{}", bucket);
        Self {
            client,
            bucket,
            identifier,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the underlying S3 client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check that the bucket exists and the credentials can reach it.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                let status = e.raw_response().map(|r| r.status().as_u16());
                classify_bucket_failure(
                    &self.identifier,
                    status,
                    DisplayErrorContext(&e).to_string(),
                )
            })?;
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn fetch(&self, key: &str) -> Result<StoredObject, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let no_such_key = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                let status = e.raw_response().map(|r| r.status().as_u16());

                classify_failure(
                    &self.location(key),
                    no_such_key,
                    status,
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        let content_type = resp.content_type().map(str::to_string);
        let e_tag = resp.e_tag().map(str::to_string);
        let last_modified = resp
            .last_modified()
            .and_then(|dt| dt.fmt(DateTimeFormat::HttpDate).ok());

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();

        Ok(StoredObject {
            data,
            content_type,
            e_tag,
            last_modified,
        })
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Map a failed S3 call onto a `StoreError`.
///
/// An object counts as missing when the service error says so, when the raw
/// response carried a 404, or (for services with non-standard error bodies)
/// when the rendered error names `NoSuchKey`/`NotFound`. A missing bucket is
/// a storage fault, never a missing object.
pub(crate) fn classify_failure(
    location: &str,
    service_not_found: bool,
    status: Option<u16>,
    message: String,
) -> StoreError {
    if message.contains("NoSuchBucket") {
        return StoreError::Storage(message);
    }

    if service_not_found || status == Some(404) {
        return StoreError::NotFound(location.to_string());
    }

    if message.contains("NoSuchKey") || message.contains("NotFound") {
        return StoreError::NotFound(location.to_string());
    }

    if status.is_none() {
        // No HTTP response at all: dispatch, timeout or DNS failure
        return StoreError::Connection(message);
    }

    StoreError::Storage(message)
}

/// Map a failed HeadBucket call onto a `StoreError`.
///
/// HeadBucket has no error body, so a 404 is the only sign the bucket is gone.
fn classify_bucket_failure(bucket: &str, status: Option<u16>, message: String) -> StoreError {
    match status {
        Some(404) => StoreError::Storage(format!("Bucket not found: {}", bucket)),
        None => StoreError::Connection(message),
        Some(_) => StoreError::Storage(message),
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO or GCS:
/// ```ignore
/// let client = create_s3_client(Some("https://storage.googleapis.com"), "auto").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint:
/// ```ignore
/// let client = create_s3_client(None, "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // Custom endpoints generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
