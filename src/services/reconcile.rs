// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation of stored beatdowns against the upstream feed.
//!
//! Given a snapshot of stored documents and a snapshot of upstream events
//! and locations, decide which documents to insert, update or soft-delete.
//! This module does no I/O; `SyncService` feeds it and applies the plan.
//!
//! Matching a fresh beatdown against storage:
//! 1. Exact current-scheme ID.
//! 2. Legacy-scheme ID. If the legacy document belongs to the same event,
//!    the beatdown is migrated to its current ID and the legacy document
//!    is left for cleanup. If it belongs to another event, the legacy ID
//!    covered several events; the fresh beatdown is inserted on its own.
//!
//! Any stored document whose ID was not produced by this pass is
//! soft-deleted, unless it already is.

use crate::models::upstream::{UpstreamEvent, UpstreamLocation};
use crate::models::Beatdown;
use crate::services::changes;
use crate::services::identity::{derive_id, IdScheme};
use crate::services::normalize::{normalize, NormalizeError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How a planned upsert relates to what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    /// No matching document
    Insert,
    /// Existing document at the current ID with changed content
    Update,
    /// Same event found under its legacy ID, rewritten at the current ID
    Migrate,
}

/// A document to write in full.
#[derive(Debug, Clone)]
pub struct PlannedUpsert {
    pub id: String,
    pub beatdown: Beatdown,
    pub kind: WriteKind,
    /// Content fields that differ from the matched document
    pub changed_fields: Vec<&'static str>,
    /// Legacy document ID this write replaces
    pub migrated_from: Option<String>,
}

/// Why an upstream event produced no beatdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InactiveEvent,
    InactiveLocation,
    NoLocationId,
    UnknownLocation,
    Invalid,
    DuplicateId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEvent {
    pub event_id: i64,
    pub reason: SkipReason,
}

/// Everything one reconciliation pass decided.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub upserts: Vec<PlannedUpsert>,
    /// Stored IDs to soft-delete, sorted
    pub soft_deletes: Vec<String>,
    /// Current IDs produced by this pass
    pub processed: HashSet<String>,
    pub unchanged: usize,
    pub skipped: Vec<SkippedEvent>,
}

impl ReconcilePlan {
    pub fn count(&self, kind: WriteKind) -> usize {
        self.upserts.iter().filter(|u| u.kind == kind).count()
    }

    pub fn migrated_count(&self) -> usize {
        self.count(WriteKind::Migrate)
    }

    /// True when applying the plan would not write anything.
    pub fn is_noop(&self) -> bool {
        self.upserts.is_empty() && self.soft_deletes.is_empty()
    }
}

/// Compute the writes needed to bring `stored` in line with upstream.
///
/// `stored` is keyed by document ID and may be the whole collection or a
/// scoped subset; only documents in it are ever soft-deleted. `now` stamps
/// `lastUpdated` on every planned upsert.
pub fn reconcile(
    stored: &HashMap<String, Beatdown>,
    events: &[UpstreamEvent],
    locations: &[UpstreamLocation],
    now: &str,
) -> ReconcilePlan {
    let locations_by_id: HashMap<i64, &UpstreamLocation> =
        locations.iter().map(|l| (l.id, l)).collect();

    let mut plan = ReconcilePlan::default();

    for event in events {
        let fresh = match fresh_beatdown(event, &locations_by_id) {
            Ok(b) => b,
            Err(reason) => {
                plan.skipped.push(SkippedEvent {
                    event_id: event.id,
                    reason,
                });
                continue;
            }
        };

        let id = derive_id(&fresh, IdScheme::Current);
        if !plan.processed.insert(id.clone()) {
            tracing::warn!(
                event_id = event.id,
                doc_id = %id,
                "Duplicate upstream event for document ID, skipping"
            );
            plan.skipped.push(SkippedEvent {
                event_id: event.id,
                reason: SkipReason::DuplicateId,
            });
            continue;
        }

        let fresh = Beatdown {
            last_updated: Some(now.to_string()),
            ..fresh
        };

        if let Some(existing) = stored.get(&id) {
            let changed_fields = changes::diff(existing, &fresh);
            if !changed_fields.is_empty() || existing.deleted || !existing.has_update_timestamp()
            {
                if existing.deleted {
                    tracing::info!(doc_id = %id, "Reviving soft-deleted beatdown");
                }
                plan.upserts.push(PlannedUpsert {
                    id,
                    beatdown: fresh,
                    kind: WriteKind::Update,
                    changed_fields,
                    migrated_from: None,
                });
            } else {
                plan.unchanged += 1;
            }
            continue;
        }

        let legacy_id = derive_id(&fresh, IdScheme::Legacy);
        match stored.get(&legacy_id) {
            Some(legacy) if legacy.event_id.is_some() && legacy.event_id == fresh.event_id => {
                tracing::debug!(
                    legacy_id = %legacy_id,
                    doc_id = %id,
                    "Migrating beatdown to current ID scheme"
                );
                plan.upserts.push(PlannedUpsert {
                    changed_fields: changes::diff(legacy, &fresh),
                    id,
                    beatdown: fresh,
                    kind: WriteKind::Migrate,
                    migrated_from: Some(legacy_id),
                });
            }
            Some(legacy) => {
                tracing::debug!(
                    legacy_id = %legacy_id,
                    legacy_event_id = ?legacy.event_id,
                    event_id = ?fresh.event_id,
                    "Legacy ID belongs to a different event, inserting separately"
                );
                plan.upserts.push(insert(id, fresh));
            }
            None => plan.upserts.push(insert(id, fresh)),
        }
    }

    plan.soft_deletes = stored
        .iter()
        .filter(|(id, beatdown)| !beatdown.deleted && !plan.processed.contains(*id))
        .map(|(id, _)| id.clone())
        .collect();
    plan.soft_deletes.sort();

    plan
}

fn insert(id: String, beatdown: Beatdown) -> PlannedUpsert {
    PlannedUpsert {
        id,
        beatdown,
        kind: WriteKind::Insert,
        changed_fields: Vec::new(),
        migrated_from: None,
    }
}

/// Resolve an event's location and normalize it, or say why not.
fn fresh_beatdown(
    event: &UpstreamEvent,
    locations_by_id: &HashMap<i64, &UpstreamLocation>,
) -> Result<Beatdown, SkipReason> {
    if !event.is_active() {
        tracing::debug!(event_id = event.id, "Skipping inactive event");
        return Err(SkipReason::InactiveEvent);
    }

    let Some(location_id) = event.location_id else {
        tracing::warn!(event_id = event.id, "Event has no location ID, skipping");
        return Err(SkipReason::NoLocationId);
    };

    let Some(location) = locations_by_id.get(&location_id) else {
        tracing::warn!(
            event_id = event.id,
            location_id,
            "Event references unknown location, skipping"
        );
        return Err(SkipReason::UnknownLocation);
    };

    if !location.is_active() {
        tracing::debug!(event_id = event.id, location_id, "Skipping event at inactive location");
        return Err(SkipReason::InactiveLocation);
    }

    normalize(location, event).map_err(|e: NormalizeError| {
        tracing::warn!(event_id = event.id, error = %e, "Failed to normalize event, skipping");
        SkipReason::Invalid
    })
}
