// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Change-notification webhook payloads and their durable log records.

use serde::{Deserialize, Serialize};

/// Channel whose notifications trigger a sync. Other channels are logged only.
pub const PROD_CHANNEL: &str = "prod";

/// Webhook payload sent by the F3 Nation API when map data changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub action: String,
    pub channel: String,
    #[serde(default)]
    pub data: WebhookData,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub org_id: Option<i64>,
}

/// Known webhook actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    MapUpdated,
    MapDeleted,
}

impl WebhookAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "map.updated" => Some(WebhookAction::MapUpdated),
            "map.deleted" => Some(WebhookAction::MapDeleted),
            _ => None,
        }
    }
}

impl WebhookPayload {
    pub fn action(&self) -> Option<WebhookAction> {
        WebhookAction::parse(&self.action)
    }

    pub fn is_prod(&self) -> bool {
        self.channel == PROD_CHANNEL
    }
}

/// What happened to a received webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookOutcome {
    /// Logged, processing not finished (a crash leaves this for replay)
    Received,
    /// Scoped sync ran to completion
    Processed,
    /// Not acted on (wrong channel, unknown action, no ids)
    Ignored,
    /// Scoped sync failed
    Failed,
    /// Body was not a valid payload
    Invalid,
}

/// Stored webhook log entry in the `webhook_logs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLog {
    /// Raw JSON body as received
    pub payload: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    pub outcome: WebhookOutcome,
    #[serde(default)]
    pub detail: Option<String>,
    pub received_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl WebhookLog {
    /// Create a log entry for a freshly received body.
    pub fn received(raw: &str, payload: Option<&WebhookPayload>, now: &str) -> Self {
        Self {
            payload: raw.to_string(),
            action: payload.map(|p| p.action.clone()),
            channel: payload.map(|p| p.channel.clone()),
            event_id: payload.and_then(|p| p.data.event_id),
            location_id: payload.and_then(|p| p.data.location_id),
            outcome: if payload.is_some() {
                WebhookOutcome::Received
            } else {
                WebhookOutcome::Invalid
            },
            detail: None,
            received_at: now.to_string(),
            completed_at: None,
        }
    }
}
