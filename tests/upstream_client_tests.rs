// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upstream client tests against an in-process stand-in for the F3 API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use beatdown_sync::db::FirestoreDb;
use beatdown_sync::error::AppError;
use beatdown_sync::services::{SyncScope, SyncService, UpstreamClient};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

mod common;
use common::{config_for, spawn_upstream};

type Hits = Arc<AtomicU32>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test_api_key")
        && headers.get("client").and_then(|v| v.to_str().ok()) == Some("beatdown-sync")
}

/// Rate-limits the first request, then serves one event.
async fn events_after_rate_limit(State(hits): State<Hits>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, HeaderMap::new(), Json(json!({}))).into_response();
    }

    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "0".parse().unwrap());
        return (StatusCode::TOO_MANY_REQUESTS, headers, Json(json!({}))).into_response();
    }

    Json(json!({
        "events": [{
            "id": 9,
            "name": "Gauntlet",
            "dayOfWeek": "monday",
            "locationId": 5,
            "startTime": "0530",
            "endTime": "0615",
            "regions": [{ "regionName": "River City" }]
        }],
        "totalCount": 1
    }))
    .into_response()
}

async fn always_unavailable(State(hits): State<Hits>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::SERVICE_UNAVAILABLE
}

async fn bad_request(State(hits): State<Hits>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::BAD_REQUEST
}

async fn one_location(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 5 {
        Json(json!({
            "location": { "id": 5, "latitude": 30.1, "longitude": -81.6, "regionName": "River City" }
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// One event out of a reported 5000.
async fn partial_events() -> Json<serde_json::Value> {
    Json(json!({
        "events": [{ "id": 9, "name": "Gauntlet", "locationId": 5 }],
        "totalCount": 5000
    }))
}

/// One location out of a reported 2.
async fn partial_locations() -> Json<serde_json::Value> {
    Json(json!({
        "locations": [{ "id": 5, "latitude": 30.1, "longitude": -81.6 }],
        "totalCount": 2
    }))
}

#[tokio::test]
async fn test_fetch_events_retries_rate_limit() {
    let hits: Hits = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route("/v1/event", get(events_after_rate_limit))
        .with_state(hits.clone());
    let base_url = spawn_upstream(router).await;

    let client = UpstreamClient::new(&config_for(&base_url));
    let events = client.fetch_events().await.expect("should succeed on retry");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, 9);
    assert_eq!(events[0].location_id, Some(5));
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let hits: Hits = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route("/v1/location", get(always_unavailable))
        .with_state(hits.clone());
    let base_url = spawn_upstream(router).await;

    let client = UpstreamClient::new(&config_for(&base_url));
    let err = client.fetch_locations().await.unwrap_err();

    assert!(matches!(err, AppError::UpstreamUnavailable { attempts: 3, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let hits: Hits = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route("/v1/location", get(bad_request))
        .with_state(hits.clone());
    let base_url = spawn_upstream(router).await;

    let client = UpstreamClient::new(&config_for(&base_url));
    let err = client.fetch_locations().await.unwrap_err();

    assert!(matches!(err, AppError::UpstreamApi(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_lookup_not_found_is_none() {
    let router = Router::new().route("/v1/location/id/{id}", get(one_location));
    let base_url = spawn_upstream(router).await;
    let client = UpstreamClient::new(&config_for(&base_url));

    let found = client.fetch_location(5).await.unwrap();
    assert_eq!(found.map(|l| l.id), Some(5));

    let missing = client.fetch_location(6).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_partial_event_list_fails() {
    let router = Router::new().route("/v1/event", get(partial_events));
    let base_url = spawn_upstream(router).await;
    let client = UpstreamClient::new(&config_for(&base_url));

    let err = client.fetch_events().await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamApi(_)));
}

#[tokio::test]
async fn test_partial_location_list_fails() {
    let router = Router::new().route("/v1/location", get(partial_locations));
    let base_url = spawn_upstream(router).await;
    let client = UpstreamClient::new(&config_for(&base_url));

    let err = client.fetch_locations().await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamApi(_)));
}

#[tokio::test]
async fn test_partial_list_fails_full_pass() {
    let router = Router::new()
        .route("/v1/event", get(partial_events))
        .route("/v1/location", get(partial_locations));
    let base_url = spawn_upstream(router).await;

    // Offline database: a pass that got past the fetch would fail reading storage
    let service = SyncService::new(
        FirestoreDb::new_mock(),
        UpstreamClient::new(&config_for(&base_url)),
    );
    let err = service.run(SyncScope::Full, false).await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamApi(_)));
}
