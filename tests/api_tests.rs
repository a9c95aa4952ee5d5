// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router tests with an offline database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use beatdown_sync::config::Config;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::create_test_app;

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app(Config::test_default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_sync_requires_token() {
    let (app, _) = create_test_app(Config::test_default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sync_rejects_wrong_token() {
    let (app, _) = create_test_app(Config::test_default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sync")
                .header(header::AUTHORIZATION, "Bearer not_the_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sync_refused_without_configured_token() {
    let config = Config {
        sync_trigger_token: None,
        ..Config::test_default()
    };
    let (app, _) = create_test_app(config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sync")
                .header(header::AUTHORIZATION, "Bearer test_sync_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sync_with_unreachable_upstream() {
    // test_default points the upstream at a closed port
    let (app, _) = create_test_app(Config::test_default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sync?dryRun=true")
                .header(header::AUTHORIZATION, "Bearer test_sync_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "upstream_unavailable");
}

#[tokio::test]
async fn test_webhook_not_acknowledged_without_log() {
    // Offline database: the payload cannot be logged, so the sender must retry
    let (app, _) = create_test_app(Config::test_default());

    let event = json!({
        "action": "map.updated",
        "channel": "prod",
        "data": { "eventId": 42, "orgId": 1 },
        "timestamp": "2026-01-01T00:00:00Z"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&event).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_webhook_rejects_get() {
    let (app, _) = create_test_app(Config::test_default());

    let response = app
        .oneshot(Request::builder().uri("/webhook").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
