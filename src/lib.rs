// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Beatdown-Sync: keep a Firestore collection of F3 workouts in step with
//! the F3 Nation API.
//!
//! A scheduled full sync and webhook-triggered scoped syncs both run the
//! same reconciliation: normalize upstream events into beatdowns, derive
//! stable document IDs, and insert, update or soft-delete to match.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::SyncService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub sync_service: SyncService,
}
