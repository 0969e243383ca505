//! API integration tests for object retrieval and error handling.
//!
//! Tests verify:
//! - Object bytes are returned unchanged with content headers
//! - Missing objects map to 404 and storage faults to 500
//! - Unknown routes, wrong methods and panics still produce JSON errors
//! - Concurrent requests do not interfere

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use image_gateway::{create_router, Disposition, RouterConfig, StoredObject};

use super::test_utils::{body_bytes, error_body, get, sample_png, Fault, MockBlobStore};

// =============================================================================
// Object Retrieval
// =============================================================================

#[tokio::test]
async fn test_image_retrieval_success() {
    let png = sample_png();
    let store = MockBlobStore::new().with_object("pikachu.png", png.clone());
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"pikachu.png\""
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        &png.len().to_string()
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600"
    );

    let body = body_bytes(response).await;
    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_empty_object_round_trips() {
    let store = MockBlobStore::new().with_object("empty.png", Vec::<u8>::new());
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/empty.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_inline_disposition() {
    let store = MockBlobStore::new().with_object("pikachu.png", sample_png());
    let router = create_router(
        store,
        RouterConfig::new().with_disposition(Disposition::Inline),
    );

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"pikachu.png\""
    );
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    let store = MockBlobStore::new().with_object("pikachu.png", sample_png());
    let router = create_router(store, RouterConfig::new().with_cache_max_age(60));

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=60"
    );
}

#[tokio::test]
async fn test_store_metadata_passed_through() {
    let object = StoredObject::new(b"sprite".to_vec())
        .with_content_type("image/webp")
        .with_e_tag("\"d41d8cd98f00b204\"")
        .with_last_modified("Mon, 19 Oct 2026 10:00:00 GMT");
    let store = MockBlobStore::new().with_stored_object("sprite", object);
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/sprite")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // No extension: the store-recorded type is used
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/webp"
    );
    assert_eq!(
        response.headers().get(header::ETAG).unwrap(),
        "\"d41d8cd98f00b204\""
    );
    assert_eq!(
        response.headers().get(header::LAST_MODIFIED).unwrap(),
        "Mon, 19 Oct 2026 10:00:00 GMT"
    );
}

#[tokio::test]
async fn test_unknown_extension_is_octet_stream() {
    let store = MockBlobStore::new().with_object("blob.bin9", vec![1u8, 2, 3]);
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/blob.bin9")).await.unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_percent_encoded_filename_is_decoded() {
    let store = MockBlobStore::new().with_object("mr mime.png", sample_png());
    let router = create_router(store.clone(), RouterConfig::new());

    let response = router.oneshot(get("/image/mr%20mime.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.fetched_keys().await, vec!["mr mime.png".to_string()]);
}

#[tokio::test]
async fn test_non_ascii_filename_disposition() {
    let store = MockBlobStore::new().with_object("pokémon.png", sample_png());
    let router = create_router(store, RouterConfig::new());

    let response = router
        .oneshot(get("/image/pok%C3%A9mon.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"pok_mon.png\"; filename*=UTF-8''pok%C3%A9mon.png"
    );
}

#[tokio::test]
async fn test_head_request_has_headers_without_body() {
    let store = MockBlobStore::new().with_object("pikachu.png", sample_png());
    let router = create_router(store, RouterConfig::new());

    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/image/pikachu.png")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert!(body_bytes(response).await.is_empty());
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_missing_object_returns_404() {
    let store = MockBlobStore::new().with_object("pikachu.png", sample_png());
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/missingno.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let error = error_body(response).await;
    assert_eq!(error.code, 404);
    assert_eq!(error.name, "File Not Found");
    assert_eq!(error.description, "The requested image file was not found.");
}

#[tokio::test]
async fn test_storage_fault_returns_500() {
    let store = MockBlobStore::new().with_fault(
        "pikachu.png",
        Fault::Storage("AccessDenied: Access Denied".to_string()),
    );
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = error_body(response).await;
    assert_eq!(error.code, 500);
    assert_eq!(error.name, "Internal Server Error");
    assert!(error.description.contains("AccessDenied"));
}

#[tokio::test]
async fn test_connection_fault_returns_500() {
    let store = MockBlobStore::new()
        .with_fault("pikachu.png", Fault::Connection("reset by peer".to_string()));
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = error_body(response).await;
    assert!(!error.description.is_empty());
}

#[tokio::test]
async fn test_store_panic_returns_500_json() {
    let store = MockBlobStore::new().with_fault("pikachu.png", Fault::Panic);
    let router = create_router(store, RouterConfig::new());

    let response = router.oneshot(get("/image/pikachu.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = error_body(response).await;
    assert_eq!(error.code, 500);
    assert!(!error.description.is_empty());
    assert!(!error.description.contains("mock store panicked"));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let router = create_router(MockBlobStore::new(), RouterConfig::new());

    let response = router.oneshot(get("/images/pikachu.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = error_body(response).await;
    assert_eq!(error.code, 404);
    assert_eq!(error.name, "Not Found");
}

#[tokio::test]
async fn test_missing_filename_is_route_not_found() {
    let store = MockBlobStore::new();
    let router = create_router(store.clone(), RouterConfig::new());

    let response = router.oneshot(get("/image/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn test_malformed_filename_returns_json_400() {
    let store = MockBlobStore::new();
    let router = create_router(store.clone(), RouterConfig::new());

    let response = router.oneshot(get("/image/%FF.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = error_body(response).await;
    assert_eq!(error.code, 400);
    assert_eq!(error.name, "Bad Request");
    assert!(!error.description.is_empty());
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn test_wrong_method_returns_json_405() {
    let router = create_router(MockBlobStore::new(), RouterConfig::new());

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/image/pikachu.png")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let error = error_body(response).await;
    assert_eq!(error.code, 405);
    assert_eq!(error.name, "Method Not Allowed");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_router(MockBlobStore::new(), RouterConfig::new());

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_interfere() {
    let mut store = MockBlobStore::new();
    for i in 0..16u8 {
        let key = format!("sprite-{}.png", i);
        store = store
            .with_object(key.clone(), vec![i; 256 + i as usize])
            .with_delay(key, Duration::from_millis(20 - i as u64));
    }
    store = store.with_fault("broken.png", Fault::Storage("boom".to_string()));

    let router = create_router(store.clone(), RouterConfig::new().with_tracing(false));

    let mut handles = Vec::new();
    for i in 0..16u8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let uri = format!("/image/sprite-{}.png", i);
            let response = router.oneshot(get(&uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            (i, body_bytes(response).await)
        }));
    }
    let broken = {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(get("/image/broken.png")).await.unwrap() })
    };

    for handle in handles {
        let (i, body) = handle.await.unwrap();
        assert_eq!(body.len(), 256 + i as usize);
        assert!(body.iter().all(|&b| b == i));
    }
    assert_eq!(
        broken.await.unwrap().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(store.fetch_count(), 17);
}
