//! Router configuration for the image gateway.
//!
//! This module defines the HTTP routes and applies middleware for request
//! signing, CORS, panic recovery and tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health              - Health check (always public)
//! /image/{filename}    - Object endpoint (signed when request signing is on)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_gateway::server::routes::{create_router, RouterConfig};
//! use image_gateway::store::{create_s3_client, S3BlobStore};
//!
//! let client = create_s3_client(None, "us-east-1").await;
//! let store = S3BlobStore::new(client, "my-images");
//!
//! // Request signing stays off unless asked for
//! let config = RouterConfig::new().with_request_signing("my-secret-key");
//! let router = create_router(store, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderName, CONTENT_TYPE};
use http::Method;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{
    request_signature_middleware, RequestSignatureAuth, REQUEST_ID_HEADER,
    REQUEST_SIGNATURE_HEADER,
};
use super::download::Disposition;
use super::handlers::{
    handle_panic, health_handler, image_handler, method_not_allowed_fallback,
    not_found_fallback, AppState,
};
use crate::store::BlobStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret for request signing; `None` leaves the object route open
    pub auth_secret: Option<String>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Content-Disposition type for served objects
    pub disposition: Disposition,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - Request signing is disabled
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Objects are served as attachments
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            auth_secret: None,
            cors_origins: None,
            cache_max_age: 3600,
            disposition: Disposition::Attachment,
            enable_tracing: true,
        }
    }

    /// Require a valid `X-Request-Signature` on the object route.
    pub fn with_request_signing(mut self, secret: impl Into<String>) -> Self {
        self.auth_secret = Some(secret.into());
        self
    }

    /// Turn request signing off again.
    pub fn without_request_signing(mut self) -> Self {
        self.auth_secret = None;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Set the Content-Disposition type.
    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Whether request signing is enabled.
    pub fn signing_enabled(&self) -> bool {
        self.auth_secret.is_some()
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// This function builds the complete Axum router with:
/// - The object route, wrapped in the signing middleware when configured
/// - The public health route
/// - JSON fallbacks for unknown routes and wrong methods
/// - Panic recovery, CORS and (optionally) request tracing
pub fn create_router<B>(store: B, config: RouterConfig) -> Router
where
    B: BlobStore + 'static,
{
    let app_state = AppState::new(store)
        .with_cache_max_age(config.cache_max_age)
        .with_disposition(config.disposition);

    let mut image_routes = Router::new()
        .route("/image/{filename}", get(image_handler::<B>))
        .with_state(app_state);

    if let Some(ref secret) = config.auth_secret {
        image_routes = image_routes.route_layer(middleware::from_fn_with_state(
            RequestSignatureAuth::new(secret),
            request_signature_middleware,
        ));
    }

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(image_routes)
        .method_not_allowed_fallback(method_not_allowed_fallback)
        .fallback(not_found_fallback)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(REQUEST_SIGNATURE_HEADER),
        ])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
