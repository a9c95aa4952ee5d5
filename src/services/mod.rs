// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod changes;
pub mod identity;
pub mod normalize;
pub mod reconcile;
pub mod sync;
pub mod upstream;

pub use identity::{derive_id, IdScheme};
pub use normalize::normalize;
pub use reconcile::{reconcile, ReconcilePlan};
pub use sync::{SyncReport, SyncScope, SyncService};
pub use upstream::UpstreamClient;
