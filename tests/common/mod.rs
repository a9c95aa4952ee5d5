// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use beatdown_sync::config::Config;
use beatdown_sync::db::FirestoreDb;
use beatdown_sync::routes::create_router;
use beatdown_sync::services::{SyncService, UpstreamClient};
use beatdown_sync::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with an offline database and the given config.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(config, FirestoreDb::new_mock())
}

/// Create a test app backed by `db` (usually the emulator).
#[allow(dead_code)]
pub fn create_test_app_with_db(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let sync_service = SyncService::new(db.clone(), UpstreamClient::new(&config));

    let state = Arc::new(AppState {
        config,
        db,
        sync_service,
    });

    (create_router(state.clone()), state)
}

/// Serve `router` on an ephemeral local port as a stand-in upstream API.
/// Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

/// Test config pointing at a mock upstream.
#[allow(dead_code)]
pub fn config_for(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        ..Config::test_default()
    }
}
