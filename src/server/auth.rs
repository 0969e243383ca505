//! Request-signature authentication for the image gateway.
//!
//! Callers prove knowledge of a shared secret by signing an opaque request
//! identifier with HMAC-SHA256:
//!
//! ```text
//! X-Request-ID:        <opaque identifier>
//! X-Request-Signature: base64(HMAC-SHA256(secret, X-Request-ID))
//! ```
//!
//! The base64 encoding uses the standard alphabet with padding. The check is
//! inert unless a deployer attaches [`request_signature_middleware`] to the
//! router (see [`crate::server::RouterConfig::with_request_signing`]).
//!
//! # Example
//!
//! ```rust
//! use image_gateway::server::auth::RequestSignatureAuth;
//!
//! let auth = RequestSignatureAuth::new("my-secret-key");
//!
//! let signature = auth.sign("req-42");
//! assert!(auth.verify("req-42", &signature).is_ok());
//! assert!(auth.verify("req-43", &signature).is_err());
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::GatewayError;

/// Header carrying the opaque request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the caller-computed signature.
pub const REQUEST_SIGNATURE_HEADER: &str = "x-request-signature";

type HmacSha256 = Hmac<Sha256>;

/// Authentication error types.
///
/// All variants are rejected with the same 401 body; the variant only shows
/// up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// `X-Request-ID` header is missing
    #[error("Missing X-Request-ID header")]
    MissingRequestId,

    /// `X-Request-Signature` header is missing
    #[error("Missing X-Request-Signature header")]
    MissingSignature,

    /// A header is present but is not visible ASCII
    #[error("Malformed {0} header")]
    MalformedHeader(&'static str),

    /// Signature does not match the request identifier
    #[error("Invalid request signature")]
    InvalidSignature,
}

/// HMAC-SHA256 request signer and verifier.
#[derive(Clone)]
pub struct RequestSignatureAuth {
    secret_key: Vec<u8>,
}

impl RequestSignatureAuth {
    /// Create a new authenticator with the given secret key.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Compute the base64-encoded signature for a request identifier.
    pub fn sign(&self, request_id: &str) -> String {
        STANDARD.encode(self.digest(request_id.as_bytes()))
    }

    /// Verify a caller-supplied signature for a request identifier.
    ///
    /// The encoded strings are compared in constant time; a length mismatch
    /// fails the comparison.
    pub fn verify(&self, request_id: &str, signature: &str) -> Result<(), AuthError> {
        let expected = self.sign(request_id);

        if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }

    /// Check the signing headers of an incoming request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let request_id = header_str(headers, REQUEST_ID_HEADER, AuthError::MissingRequestId)?;
        let signature = header_str(headers, REQUEST_SIGNATURE_HEADER, AuthError::MissingSignature)?;

        self.verify(request_id, signature)
    }

    fn digest(&self, message: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for RequestSignatureAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSignatureAuth")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
    missing: AuthError,
) -> Result<&'a str, AuthError> {
    let value = headers.get(name).ok_or(missing)?;
    value.to_str().map_err(|_| AuthError::MalformedHeader(name))
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware that rejects requests without a valid request signature.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::get};
/// use image_gateway::server::auth::{RequestSignatureAuth, request_signature_middleware};
///
/// let auth = RequestSignatureAuth::new("secret-key");
/// let app = Router::new()
///     .route("/image/{filename}", get(image_handler))
///     .layer(middleware::from_fn_with_state(auth, request_signature_middleware));
/// ```
pub async fn request_signature_middleware(
    State(auth): State<RequestSignatureAuth>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    auth.verify_headers(request.headers())?;

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
