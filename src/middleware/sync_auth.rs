// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduler authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require `Authorization: Bearer <SYNC_TRIGGER_TOKEN>` for `/tasks/*` routes.
pub async fn require_sync_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.sync_trigger_token.as_deref() else {
        tracing::warn!("Blocked tasks request: no sync trigger token configured");
        return Err(StatusCode::FORBIDDEN);
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
            Ok(next.run(request).await)
        }
        Some(_) => {
            tracing::warn!("Blocked tasks request: invalid sync trigger token");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Blocked tasks request: missing bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
