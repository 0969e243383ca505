use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// An object read in full from the blob store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Raw object bytes
    pub data: Bytes,

    /// Content type recorded by the store, if any
    pub content_type: Option<String>,

    /// Entity tag recorded by the store, if any
    pub e_tag: Option<String>,

    /// Last modification time as an HTTP date, if known
    pub last_modified: Option<String>,
}

impl StoredObject {
    /// Create an object with no store metadata.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
            e_tag: None,
            last_modified: None,
        }
    }

    /// Attach the store-reported content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Attach the store-reported entity tag.
    pub fn with_e_tag(mut self, e_tag: impl Into<String>) -> Self {
        self.e_tag = Some(e_tag.into());
        self
    }

    /// Attach the last modification time (HTTP date format).
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    /// Size of the object body in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the object body is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Trait for fetching whole objects from a bucket.
///
/// The gateway holds one implementation behind an `Arc` and shares it across
/// requests, so implementations must be thread-safe and must not rely on
/// per-request mutable state.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the object stored under `key` into memory.
    ///
    /// Returns `StoreError::NotFound` when the bucket has no such object.
    async fn fetch(&self, key: &str) -> Result<StoredObject, StoreError>;

    /// Human-readable location of the bucket (for logging).
    ///
    /// For S3, this would typically be `s3://bucket`.
    fn identifier(&self) -> &str;
}
