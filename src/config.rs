//! Configuration management for the image gateway.
//!
//! This module provides the command-line interface, which supports:
//! - Subcommands (`serve`, `sign`, `check`)
//! - Environment variables with the `GATEWAY_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use image_gateway::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Serving bucket {}", config.bucket),
//!     Command::Sign(config) => println!("Signing {}", config.request_id),
//!     Command::Check(config) => println!("Checking bucket {}", config.bucket),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `GATEWAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `GATEWAY_PORT` - Server port (default: 8080)
//! - `GATEWAY_BUCKET` - Bucket holding the served objects (required)
//! - `GATEWAY_S3_ENDPOINT` - Custom endpoint for S3-compatible services
//! - `GATEWAY_S3_REGION` - Region (default: us-east-1)
//! - `GATEWAY_AUTH_ENABLED` - Require request signatures (default: false)
//! - `GATEWAY_AUTH_SECRET` - HMAC secret for request signatures
//! - `GATEWAY_DISPOSITION` - `attachment` or `inline` (default: attachment)
//! - `GATEWAY_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `GATEWAY_CORS_ORIGINS` - Comma-separated allowed origins (default: any)

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::server::Disposition;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image Gateway - serve objects from blob storage over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed arguments and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP gateway.
    Serve(ServeConfig),

    /// Compute the X-Request-Signature for a request identifier.
    Sign(SignConfig),

    /// Check bucket connectivity and, optionally, a single object.
    Check(CheckConfig),
}

// =============================================================================
// Serve
// =============================================================================

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GATEWAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GATEWAY_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Bucket holding the served objects.
    #[arg(long, env = "GATEWAY_BUCKET")]
    pub bucket: String,

    /// Custom endpoint URL for S3-compatible services.
    ///
    /// Use `https://storage.googleapis.com` for Google Cloud Storage or
    /// `http://localhost:9000` for a local MinIO. If not specified, uses the
    /// default AWS S3 endpoint.
    #[arg(long, env = "GATEWAY_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Region for the storage client.
    #[arg(long, default_value = DEFAULT_REGION, env = "GATEWAY_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // Request Signing
    // =========================================================================
    /// Require a valid X-Request-Signature header on object requests.
    #[arg(long, default_value_t = false, env = "GATEWAY_AUTH_ENABLED")]
    pub auth_enabled: bool,

    /// Secret key for HMAC-SHA256 request signatures.
    #[arg(long, env = "GATEWAY_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<String>,

    // =========================================================================
    // Response Configuration
    // =========================================================================
    /// How browsers should present served objects.
    #[arg(long, value_enum, default_value_t = Disposition::Attachment, env = "GATEWAY_DISPOSITION")]
    pub disposition: Disposition,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "GATEWAY_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GATEWAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("Bucket name is required. Set --bucket or GATEWAY_BUCKET".to_string());
        }

        if self.auth_enabled && self.auth_secret_or_empty().is_empty() {
            return Err(
                "Request signing is enabled but no secret provided. \
                 Set --auth-secret or GATEWAY_AUTH_SECRET, or drop --auth-enabled"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the auth secret, or an empty string if not set.
    pub fn auth_secret_or_empty(&self) -> &str {
        self.auth_secret.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Sign
// =============================================================================

/// Output format for the `sign` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignOutputFormat {
    /// Only the base64 signature
    Signature,
    /// Both request headers, ready to paste into curl
    Headers,
    /// JSON object with the identifier and signature
    Json,
}

/// Configuration for the `sign` command.
#[derive(Args, Debug, Clone)]
pub struct SignConfig {
    /// Request identifier to sign (sent as X-Request-ID).
    pub request_id: String,

    /// Secret key shared with the gateway.
    #[arg(long, env = "GATEWAY_AUTH_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SignOutputFormat::Signature)]
    pub format: SignOutputFormat,
}

impl SignConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("Secret must not be empty. Set --secret or GATEWAY_AUTH_SECRET".to_string());
        }
        if self.request_id.is_empty() {
            return Err("Request identifier must not be empty".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Check
// =============================================================================

/// Configuration for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Bucket to check.
    #[arg(long, env = "GATEWAY_BUCKET")]
    pub bucket: String,

    /// Custom endpoint URL for S3-compatible services.
    #[arg(long, env = "GATEWAY_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Region for the storage client.
    #[arg(long, default_value = DEFAULT_REGION, env = "GATEWAY_S3_REGION")]
    pub s3_region: String,

    /// Fetch this object to confirm it can be served.
    #[arg(long)]
    pub object: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    /// Return the bucket name, or an error message if it is blank.
    pub fn resolve_bucket(&self) -> Result<String, String> {
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            Err("no bucket configured (set --bucket or GATEWAY_BUCKET)".to_string())
        } else {
            Ok(bucket.to_string())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
