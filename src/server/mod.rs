//! HTTP server layer for the image gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                   GET /image/{filename}                         │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │  handlers   │  │    auth     │  │  download  │  │ routes  │  │
//! │  │ (+ errors)  │  │ (signature) │  │ (headers)  │  │         │  │
//! │  └─────────────┘  └─────────────┘  └────────────┘  └─────────┘  │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  │
//!                                  ▼
//!                        BlobStore (S3-compatible)
//! ```

pub mod auth;
pub mod download;
pub mod handlers;
pub mod routes;

pub use auth::{request_signature_middleware, AuthError, RequestSignatureAuth};
pub use download::{content_disposition, content_type_for, Disposition};
pub use handlers::{
    health_handler, image_handler, AppState, ErrorResponse, HealthResponse,
};
pub use routes::{create_router, RouterConfig};
