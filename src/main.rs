// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Beatdown-Sync API Server
//!
//! Receives F3 Nation map webhooks and scheduled sync triggers, and keeps
//! the Firestore `beatdowns` collection in step with the upstream API.

use beatdown_sync::{
    config::Config,
    db::FirestoreDb,
    services::{SyncService, UpstreamClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment; missing credentials stop here
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
    })?;
    tracing::info!(port = config.port, "Starting Beatdown-Sync API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let upstream = UpstreamClient::new(&config);
    tracing::info!(base_url = %config.api_base_url, "Upstream client initialized");

    if config.sync_trigger_token.is_none() {
        tracing::warn!("SYNC_TRIGGER_TOKEN not set; /tasks/sync will refuse all requests");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sync_service: SyncService::new(db.clone(), upstream),
        db,
    });

    // Build router
    let app = beatdown_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("beatdown_sync=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
