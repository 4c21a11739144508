// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloudinary upload and delete against a mock server.

use barber_directory::config::CloudinaryConfig;
use barber_directory::error::AppError;
use barber_directory::services::{ImageHost, ImageUpload, UploadProgress};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host_for(server: &MockServer) -> ImageHost {
    ImageHost::new(Some(CloudinaryConfig {
        cloud_name: "demo-cloud".to_string(),
        upload_preset: "unsigned".to_string(),
    }))
    .with_base_url(server.uri())
}

fn image(size: usize) -> ImageUpload {
    ImageUpload {
        file_name: "corte.jpg".to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![7; size],
    }
}

#[tokio::test]
async fn test_upload_returns_secure_url_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/image/upload"))
        .and(body_string_contains("return_delete_token"))
        .and(body_string_contains("clientes/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cloudinary.com/demo-cloud/image/upload/v1/c.jpg",
            "url": "http://res.cloudinary.com/demo-cloud/image/upload/v1/c.jpg",
            "delete_token": "tok-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = Arc::new(AtomicU64::new(0));
    let seen = sent.clone();
    let progress: UploadProgress = Arc::new(move |bytes, _| seen.store(bytes, Ordering::SeqCst));

    let size = 150 * 1024;
    let asset = host_for(&server)
        .upload(image(size), "clientes/c1", Some(progress))
        .await
        .unwrap();

    assert!(asset.url.starts_with("https://"));
    assert_eq!(asset.delete_token.as_deref(), Some("tok-1"));
    assert_eq!(sent.load(Ordering::SeqCst), size as u64);
}

#[tokio::test]
async fn test_rejected_delete_token_is_retried_without_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/image/upload"))
        .and(body_string_contains("return_delete_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "return_delete_token parameter is not allowed when using unsigned upload" }
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cloudinary.com/demo-cloud/c.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let asset = host_for(&server)
        .upload(image(10), "clientes/c1", None)
        .await
        .unwrap();

    assert_eq!(asset.url, "https://res.cloudinary.com/demo-cloud/c.jpg");
    assert!(asset.delete_token.is_none());
}

#[tokio::test]
async fn test_other_upload_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/image/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Upload preset not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = host_for(&server)
        .upload(image(10), "clientes/c1", None)
        .await
        .unwrap_err();

    match err {
        AppError::ImageHost(msg) => assert!(msg.contains("Upload preset not found")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_by_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/delete_by_token"))
        .and(body_string_contains("token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    host_for(&server).delete("tok-1").await.unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_image_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo-cloud/delete_by_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("stale token"))
        .mount(&server)
        .await;

    let err = host_for(&server).delete("tok-1").await.unwrap_err();
    assert!(matches!(err, AppError::ImageHost(_)));
}
