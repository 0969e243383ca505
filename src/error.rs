use thiserror::Error;

use crate::server::auth::AuthError;

/// Errors that can occur when reading from the blob store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The object does not exist in the bucket
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Error reported by S3 or the S3-compatible service
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network or connection error while transferring the object body
    #[error("Connection error: {0}")]
    Connection(String),
}

impl StoreError {
    /// Whether the store reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Errors surfaced to HTTP callers.
///
/// Every variant is rendered by the single `IntoResponse` implementation in
/// [`crate::server::handlers`] as `{code, name, description}` JSON.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The requested object is absent from the bucket (404)
    #[error("The requested image file was not found.")]
    FileNotFound,

    /// Request signature missing or invalid (401)
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    /// Any other failure (500)
    #[error("{0}")]
    Internal(String),

    /// Framework-level failure such as an unknown route or a wrong method
    #[error("{description}")]
    Http {
        status: http::StatusCode,
        description: String,
    },
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => GatewayError::FileNotFound,
            other => GatewayError::Internal(other.to_string()),
        }
    }
}
