//! # Image Gateway
//!
//! A single-endpoint HTTP gateway that serves objects from S3-compatible
//! blob storage (AWS S3, MinIO, or Google Cloud Storage through its XML
//! interoperability API) as file downloads.
//!
//! ## Features
//!
//! - **One route**: `GET /image/{filename}` returns the object's bytes with
//!   a content type and disposition derived from the filename
//! - **Structured errors**: every failure is a `{code, name, description}`
//!   JSON body with the matching status
//! - **Optional request signing**: HMAC-SHA256 over `X-Request-ID`, attached
//!   only when a deployer asks for it
//!
//! ## Architecture
//!
//! - [`store`] - Blob store trait and the S3 implementation
//! - [`server`] - Axum handlers, error mapping, signing middleware, router
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types shared across layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_gateway::{create_router, create_s3_client, RouterConfig, S3BlobStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_s3_client(None, "us-east-1").await;
//!     let store = S3BlobStore::new(client, "my-images");
//!     let router = create_router(store, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, SignConfig, SignOutputFormat};
pub use error::{GatewayError, StoreError};
pub use server::{
    create_router, health_handler, image_handler, request_signature_middleware, AppState,
    AuthError, Disposition, ErrorResponse, HealthResponse, RequestSignatureAuth, RouterConfig,
};
pub use store::{create_s3_client, BlobStore, S3BlobStore, StoredObject};
