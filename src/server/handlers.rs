//! HTTP request handlers for the image gateway.
//!
//! # Endpoints
//!
//! - `GET /image/{filename}` - Serve an object from the configured bucket
//! - `GET /health` - Health check endpoint
//!
//! Every failure, including unknown routes, wrong methods and handler
//! panics, is rendered through [`GatewayError`]'s `IntoResponse`
//! implementation as:
//!
//! ```json
//! { "code": 404, "name": "File Not Found", "description": "The requested image file was not found." }
//! ```

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::download::{content_disposition, content_type_for, Disposition};
use crate::error::GatewayError;
use crate::store::BlobStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the blob store.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<B: BlobStore> {
    /// The store objects are read from
    pub store: Arc<B>,

    /// Cache-Control max-age in seconds for served objects
    pub cache_max_age: u32,

    /// Content-Disposition type for served objects
    pub disposition: Disposition,
}

impl<B: BlobStore> AppState<B> {
    /// Create a new application state with the given store.
    pub fn new(store: B) -> Self {
        Self {
            store: Arc::new(store),
            cache_max_age: 3600,
            disposition: Disposition::Attachment,
        }
    }

    /// Set the Cache-Control max-age.
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    /// Set the Content-Disposition type.
    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }
}

impl<B: BlobStore> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache_max_age: self.cache_max_age,
            disposition: self.disposition,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body returned for all error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub code: u16,

    /// Short error name (e.g., "File Not Found")
    pub name: String,

    /// Human-readable description
    pub description: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Name reported for a missing object.
pub const FILE_NOT_FOUND_NAME: &str = "File Not Found";

/// Name reported for a rejected request signature.
pub const UNAUTHORIZED_NAME: &str = "Unauthorized Request";

/// Description reported for a rejected request signature.
pub const UNAUTHORIZED_DESCRIPTION: &str = "The request is not authorized to perform this action";

/// Description reported for a panic or an error with no message.
pub const INTERNAL_ERROR_DESCRIPTION: &str = "The server encountered an internal error and was \
     unable to complete your request. Either the server is overloaded or there is an error in \
     the application.";

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::FileNotFound => StatusCode::NOT_FOUND,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Http { status, .. } => *status,
        }
    }

    /// The `{code, name, description}` record sent to the caller.
    pub fn to_error_response(&self) -> ErrorResponse {
        let status = self.status();
        let (name, description) = match self {
            GatewayError::FileNotFound => (FILE_NOT_FOUND_NAME.to_string(), self.to_string()),
            // The reason stays in the logs only
            GatewayError::Unauthorized(_) => (
                UNAUTHORIZED_NAME.to_string(),
                UNAUTHORIZED_DESCRIPTION.to_string(),
            ),
            GatewayError::Internal(message) => (
                reason_phrase(status),
                non_empty(message, INTERNAL_ERROR_DESCRIPTION),
            ),
            GatewayError::Http { description, .. } => {
                let name = reason_phrase(status);
                let description = non_empty(description, &name);
                (name, description)
            }
        };

        ErrorResponse {
            code: status.as_u16(),
            name,
            description,
        }
    }
}

/// Convert GatewayError to HTTP response.
///
/// Errors are logged according to their severity:
/// - 5xx errors at ERROR level
/// - 401 at WARN level (could indicate probing)
/// - other 4xx at DEBUG level (common and expected)
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status = self.status();

        match &self {
            GatewayError::Unauthorized(reason) => {
                warn!(status = status.as_u16(), "Request rejected: {}", reason);
            }
            _ if status.is_server_error() => {
                error!(
                    status = status.as_u16(),
                    name = %body.name,
                    "Server error: {}",
                    body.description
                );
            }
            _ => {
                debug!(
                    status = status.as_u16(),
                    name = %body.name,
                    "Client error: {}",
                    body.description
                );
            }
        }

        (status, Json(body)).into_response()
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Error")
        .to_string()
}

fn non_empty(text: &str, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle object requests.
///
/// # Endpoint
///
/// `GET /image/{filename}`
///
/// # Response
///
/// - `200 OK`: the object bytes, with `Content-Type` guessed from the
///   filename and a `Content-Disposition` naming it
/// - `404 Not Found`: the bucket has no such object
/// - `500 Internal Server Error`: any other storage failure
///
/// # Headers
///
/// - `Content-Type`, `Content-Length`, `Content-Disposition`
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `ETag` and `Last-Modified` when the store reports them
pub async fn image_handler<B: BlobStore>(
    State(state): State<AppState<B>>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, GatewayError> {
    let Path(filename) = filename.map_err(|rejection| GatewayError::Http {
        status: StatusCode::BAD_REQUEST,
        description: rejection.body_text(),
    })?;

    let object = state.store.fetch(&filename).await.map_err(|err| {
        if !err.is_not_found() {
            warn!(
                store = state.store.identifier(),
                filename = %filename,
                "Fetch failed: {}",
                err
            );
        }
        GatewayError::from(err)
    })?;

    info!(
        store = state.store.identifier(),
        filename = %filename,
        bytes = object.len(),
        "Serving object"
    );

    let content_type = content_type_for(&filename, object.content_type.as_deref());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(state.disposition, &filename),
        )
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        );

    if let Some(ref e_tag) = object.e_tag {
        builder = builder.header(header::ETAG, e_tag);
    }
    if let Some(ref last_modified) = object.last_modified {
        builder = builder.header(header::LAST_MODIFIED, last_modified);
    }

    builder
        .body(Body::from(object.data))
        .map_err(|e| GatewayError::Internal(format!("Failed to build response: {}", e)))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for paths that match no route.
pub async fn not_found_fallback() -> GatewayError {
    GatewayError::Http {
        status: StatusCode::NOT_FOUND,
        description: "The requested URL was not found on the server. If you entered the URL \
                      manually please check your spelling and try again."
            .to_string(),
    }
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed_fallback() -> GatewayError {
    GatewayError::Http {
        status: StatusCode::METHOD_NOT_ALLOWED,
        description: "The method is not allowed for the requested URL.".to_string(),
    }
}

/// Turn a handler panic into a 500 response.
///
/// The panic payload is logged but never sent to the caller.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "Handler panicked");

    GatewayError::Internal(INTERNAL_ERROR_DESCRIPTION.to_string()).into_response()
}
