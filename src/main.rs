//! Image Gateway - serve objects from blob storage over HTTP.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_gateway::{
    config::{CheckConfig, Cli, Command, ServeConfig, SignConfig, SignOutputFormat},
    create_router, create_s3_client,
    server::auth::RequestSignatureAuth,
    BlobStore, RouterConfig, S3BlobStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Sign(config) => run_sign(config),
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Image Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Bucket: {}", config.bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  Endpoint: {}", endpoint);
    }
    info!("  Region: {}", config.s3_region);
    info!("  Disposition: {:?}", config.disposition);

    if config.auth_enabled {
        info!("  Request signing: enabled");
    } else {
        warn!("  Request signing: disabled - /image/{{filename}} is publicly accessible");
    }

    let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let store = S3BlobStore::new(client, config.bucket.clone());

    info!("Connecting to {}...", store.identifier());
    if let Err(e) = store.probe().await {
        error!("  Failed to reach bucket: {}", e);
        error!("  Please check:");
        error!("    - Your credentials are configured correctly");
        error!("    - The bucket '{}' exists and is accessible", config.bucket);
        error!("    - The endpoint is correct (GCS interop: https://storage.googleapis.com)");
        return ExitCode::FAILURE;
    }
    info!("  Connected successfully");

    let router = create_router(store, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);
    info!("  curl -OJ http://{}/image/<filename>", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_gateway=debug,tower_http=debug"
    } else {
        "image_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_disposition(config.disposition)
        .with_tracing(!config.no_tracing);

    if config.auth_enabled {
        router_config = router_config.with_request_signing(config.auth_secret_or_empty());
    }

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Sign Command
// =============================================================================

fn run_sign(config: SignConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let auth = RequestSignatureAuth::new(&config.secret);
    let signature = auth.sign(&config.request_id);

    match config.format {
        SignOutputFormat::Signature => {
            println!("{}", signature);
        }
        SignOutputFormat::Headers => {
            println!("X-Request-ID: {}", config.request_id);
            println!("X-Request-Signature: {}", signature);
        }
        SignOutputFormat::Json => {
            let json = serde_json::json!({
                "request_id": config.request_id,
                "signature": signature,
                "headers": {
                    "X-Request-ID": config.request_id,
                    "X-Request-Signature": signature,
                },
            });
            match serde_json::to_string_pretty(&json) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Image Gateway Configuration Check");
    println!("═════════════════════════════════");
    println!();

    let bucket = match config.resolve_bucket() {
        Ok(b) => {
            println!("✓ Bucket: {}", b);
            b
        }
        Err(e) => {
            println!("✗ Bucket: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref endpoint) = config.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.s3_region);
    println!();

    print!("Testing bucket access... ");

    let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let store = S3BlobStore::new(client, bucket.clone());

    if let Err(e) = store.probe().await {
        println!("✗ failed");
        println!();
        println!("Error: {}", e);
        println!();
        println!("Please check:");
        println!("  - Your credentials are configured correctly");
        println!("  - The bucket '{}' exists and is accessible", bucket);
        if config.s3_endpoint.is_some() {
            println!("  - The endpoint is correct and reachable");
        }
        return ExitCode::FAILURE;
    }
    println!("✓ success");

    if let Some(ref key) = config.object {
        println!();
        print!("Fetching '{}'... ", key);

        match store.fetch(key).await {
            Ok(object) => {
                println!("✓ found");
                println!("  Size: {} bytes", object.len());
                if let Some(ref content_type) = object.content_type {
                    println!("  Content-Type: {}", content_type);
                }
            }
            Err(e) if e.is_not_found() => {
                println!("✗ not found");
                println!();
                println!("  The object '{}' does not exist in the bucket.", key);
                return ExitCode::FAILURE;
            }
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("═════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
