//! Blob store layer.
//!
//! The gateway reads whole objects through the [`BlobStore`] trait. The
//! production implementation talks to S3-compatible storage; tests plug in
//! in-memory fakes.

mod blob_store;
mod s3_store;

pub use blob_store::{BlobStore, StoredObject};
pub use s3_store::{create_s3_client, S3BlobStore};
