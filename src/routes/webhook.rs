// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for F3 Nation map change notifications.
//!
//! Every body is logged to Firestore before anything else happens. A
//! `prod` notification then runs a sync scoped to the event or location it
//! names. Both `map.updated` and `map.deleted` re-read upstream rather than
//! trusting the action: a deleted event shows up as a 404 and its
//! beatdowns are soft-deleted by the scoped pass.

use crate::models::{WebhookLog, WebhookOutcome, WebhookPayload};
use crate::services::SyncScope;
use crate::time_utils::{format_utc_compact, format_utc_rfc3339};
use crate::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Disambiguates log IDs for webhooks received in the same nanosecond.
static LOG_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(handle_event))
}

/// Why a valid payload was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotProd,
    UnknownAction,
    NoTarget,
}

impl IgnoreReason {
    fn as_str(self) -> &'static str {
        match self {
            IgnoreReason::NotProd => "non-prod channel",
            IgnoreReason::UnknownAction => "unknown action",
            IgnoreReason::NoTarget => "no eventId or locationId",
        }
    }
}

/// Decide which scoped sync a payload triggers. Event ID wins over location ID.
pub fn sync_scope_for(payload: &WebhookPayload) -> Result<SyncScope, IgnoreReason> {
    if !payload.is_prod() {
        return Err(IgnoreReason::NotProd);
    }
    if payload.action().is_none() {
        return Err(IgnoreReason::UnknownAction);
    }

    match (payload.data.event_id, payload.data.location_id) {
        (Some(event_id), _) => Ok(SyncScope::Event(event_id)),
        (None, Some(location_id)) => Ok(SyncScope::Location(location_id)),
        (None, None) => Err(IgnoreReason::NoTarget),
    }
}

/// Handle incoming webhook events (POST).
///
/// The body is taken as raw bytes so that malformed payloads are logged
/// too. Returns 500 only when the body could not be logged, so the sender
/// retries; everything after that point answers 200.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> StatusCode {
    let received = chrono::Utc::now();
    let now = format_utc_rfc3339(received);
    let log_id = format!(
        "{}-{}",
        format_utc_compact(received),
        LOG_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    );

    let raw = String::from_utf8_lossy(&body);
    let payload = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::error!(error = %e, payload = %raw, "Failed to parse webhook payload");
            None
        }
    };

    let log = WebhookLog::received(&raw, payload.as_ref(), &now);
    if let Err(e) = state.db.set_webhook_log(&log_id, &log).await {
        tracing::error!(error = %e, log_id = %log_id, "Failed to log webhook");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let Some(payload) = payload else {
        return StatusCode::OK;
    };

    tracing::info!(
        log_id = %log_id,
        action = %payload.action,
        channel = %payload.channel,
        event_id = ?payload.data.event_id,
        location_id = ?payload.data.location_id,
        "Webhook received"
    );

    let (outcome, detail) = match sync_scope_for(&payload) {
        Err(reason) => {
            tracing::debug!(log_id = %log_id, reason = reason.as_str(), "Ignoring webhook");
            (WebhookOutcome::Ignored, Some(reason.as_str().to_string()))
        }
        Ok(scope) => match state.sync_service.run(scope, false).await {
            Ok(report) if report.complete => (
                WebhookOutcome::Processed,
                Some(format!(
                    "{}: {} written, {} unchanged",
                    report.scope,
                    report.writes(),
                    report.unchanged
                )),
            ),
            Ok(report) => (WebhookOutcome::Failed, report.error),
            Err(e) => {
                tracing::error!(log_id = %log_id, scope = %scope, error = %e, "Webhook sync failed");
                (WebhookOutcome::Failed, Some(e.to_string()))
            }
        },
    };

    let completed = format_utc_rfc3339(chrono::Utc::now());
    if let Err(e) = state
        .db
        .set_webhook_outcome(&log_id, outcome, detail, &completed)
        .await
    {
        tracing::warn!(error = %e, log_id = %log_id, "Failed to record webhook outcome");
    }

    StatusCode::OK
}
