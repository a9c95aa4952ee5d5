// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled task routes.
//!
//! Called by Cloud Scheduler, not by users; guarded by `require_sync_auth`.

use crate::services::SyncScope;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Task routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/sync", post(run_sync))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncParams {
    #[serde(default)]
    dry_run: bool,
}

/// Run a full sync pass and return its report.
///
/// 200 when the pass completed, 500 with the report when a batch failed
/// partway, and the mapped error when upstream or storage could not be read.
async fn run_sync(State(state): State<Arc<AppState>>, Query(params): Query<SyncParams>) -> Response {
    match state.sync_service.run(SyncScope::Full, params.dry_run).await {
        Ok(report) if report.complete => (StatusCode::OK, Json(report)).into_response(),
        Ok(report) => (StatusCode::INTERNAL_SERVER_ERROR, Json(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Scheduled sync failed");
            e.into_response()
        }
    }
}
