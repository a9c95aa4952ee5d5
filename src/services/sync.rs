// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync passes: fetch upstream, read storage, reconcile, write.
//!
//! A full pass covers the whole collection. Scoped passes (one event or one
//! location, triggered by webhooks) read and write only documents tied to
//! that event or location, so an overlapping full pass and webhook pass can
//! only conflict on those few documents.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Beatdown;
use crate::services::reconcile::{reconcile, ReconcilePlan, SkippedEvent, WriteKind};
use crate::services::upstream::UpstreamClient;
use crate::time_utils::format_utc_rfc3339;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// What a sync pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    Full,
    Event(i64),
    Location(i64),
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncScope::Full => f.write_str("full"),
            SyncScope::Event(id) => write!(f, "event:{}", id),
            SyncScope::Location(id) => write!(f, "location:{}", id),
        }
    }
}

/// Kind of change applied to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Migrate,
    SoftDelete,
}

impl From<WriteKind> for ChangeKind {
    fn from(kind: WriteKind) -> Self {
        match kind {
            WriteKind::Insert => ChangeKind::Insert,
            WriteKind::Update => ChangeKind::Update,
            WriteKind::Migrate => ChangeKind::Migrate,
        }
    }
}

/// Per-document diagnostic line.
#[derive(Debug, Clone, Serialize)]
pub struct RecordChange {
    pub id: String,
    pub kind: ChangeKind,
    /// Content fields that changed (empty for inserts and soft-deletes)
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

/// Summary of one sync pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub scope: String,
    pub dry_run: bool,
    pub inserted: usize,
    pub updated: usize,
    pub migrated: usize,
    pub unchanged: usize,
    pub soft_deleted: usize,
    pub skipped: Vec<SkippedEvent>,
    pub changes: Vec<RecordChange>,
    pub batches_total: usize,
    pub batches_committed: usize,
    /// False when a batch failed and later batches were not written
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    fn from_plan(scope: SyncScope, plan: &ReconcilePlan, dry_run: bool) -> Self {
        let mut changes: Vec<RecordChange> = plan
            .upserts
            .iter()
            .map(|u| RecordChange {
                id: u.id.clone(),
                kind: u.kind.into(),
                fields: u.changed_fields.iter().map(|f| f.to_string()).collect(),
                migrated_from: u.migrated_from.clone(),
            })
            .collect();

        changes.extend(plan.soft_deletes.iter().map(|id| RecordChange {
            id: id.clone(),
            kind: ChangeKind::SoftDelete,
            fields: Vec::new(),
            migrated_from: None,
        }));

        Self {
            scope: scope.to_string(),
            dry_run,
            inserted: plan.count(WriteKind::Insert),
            updated: plan.count(WriteKind::Update),
            migrated: plan.migrated_count(),
            unchanged: plan.unchanged,
            soft_deleted: plan.soft_deletes.len(),
            skipped: plan.skipped.clone(),
            changes,
            batches_total: 0,
            batches_committed: 0,
            complete: true,
            error: None,
        }
    }

    /// Number of documents this pass wrote (or would write).
    pub fn writes(&self) -> usize {
        self.inserted + self.updated + self.migrated + self.soft_deleted
    }

    fn log_summary(&self) {
        if self.complete {
            tracing::info!(
                scope = %self.scope,
                dry_run = self.dry_run,
                inserted = self.inserted,
                updated = self.updated,
                migrated = self.migrated,
                unchanged = self.unchanged,
                soft_deleted = self.soft_deleted,
                skipped = self.skipped.len(),
                "Sync pass complete"
            );
        } else {
            tracing::error!(
                scope = %self.scope,
                inserted = self.inserted,
                updated = self.updated,
                migrated = self.migrated,
                soft_deleted = self.soft_deleted,
                batches_committed = self.batches_committed,
                batches_total = self.batches_total,
                error = self.error.as_deref().unwrap_or_default(),
                "Sync pass stopped partway"
            );
        }
    }
}

/// Runs sync passes against the upstream API and Firestore.
#[derive(Clone)]
pub struct SyncService {
    db: FirestoreDb,
    upstream: UpstreamClient,
}

impl SyncService {
    pub fn new(db: FirestoreDb, upstream: UpstreamClient) -> Self {
        Self { db, upstream }
    }

    /// Run one pass over `scope`.
    ///
    /// Fails outright if upstream or storage cannot be read; nothing has
    /// been written in that case. A failure while writing still returns a
    /// report, with `complete == false`.
    pub async fn run(&self, scope: SyncScope, dry_run: bool) -> Result<SyncReport, AppError> {
        tracing::info!(scope = %scope, dry_run, "Starting sync pass");

        let (events, locations, stored) = match scope {
            SyncScope::Full => {
                let (events, locations) = tokio::try_join!(
                    self.upstream.fetch_events(),
                    self.upstream.fetch_locations()
                )?;
                (events, locations, self.db.list_beatdowns().await?)
            }
            SyncScope::Event(event_id) => {
                let event = self.upstream.fetch_event(event_id).await?;
                let location = match event.as_ref().and_then(|e| e.location_id) {
                    Some(location_id) => self.upstream.fetch_location(location_id).await?,
                    None => None,
                };
                if event.is_none() {
                    tracing::info!(event_id, "Event no longer exists upstream");
                }
                (
                    event.into_iter().collect(),
                    location.into_iter().collect(),
                    self.db.list_beatdowns_for_event(event_id).await?,
                )
            }
            SyncScope::Location(location_id) => {
                let location = self.upstream.fetch_location(location_id).await?;
                let events = match location {
                    Some(_) => self
                        .upstream
                        .fetch_events()
                        .await?
                        .into_iter()
                        .filter(|e| e.location_id == Some(location_id))
                        .collect(),
                    None => {
                        tracing::info!(location_id, "Location no longer exists upstream");
                        Vec::new()
                    }
                };
                (
                    events,
                    location.into_iter().collect(),
                    self.db.list_beatdowns_for_location(location_id).await?,
                )
            }
        };

        let now = format_utc_rfc3339(chrono::Utc::now());
        Ok(self
            .apply(scope, &stored, &events, &locations, &now, dry_run)
            .await)
    }

    async fn apply(
        &self,
        scope: SyncScope,
        stored: &HashMap<String, Beatdown>,
        events: &[crate::models::UpstreamEvent],
        locations: &[crate::models::UpstreamLocation],
        now: &str,
        dry_run: bool,
    ) -> SyncReport {
        let plan = reconcile(stored, events, locations, now);
        let mut report = SyncReport::from_plan(scope, &plan, dry_run);

        for change in &report.changes {
            tracing::debug!(
                doc_id = %change.id,
                kind = ?change.kind,
                fields = ?change.fields,
                "Planned beatdown change"
            );
        }

        if !dry_run && !plan.is_noop() {
            let result = self
                .db
                .commit_beatdowns(&plan.upserts, &plan.soft_deletes, now)
                .await;
            report.batches_total = result.batches_total;
            report.batches_committed = result.batches_committed;
            report.complete = result.is_complete();
            report.error = result.error.map(|e| e.to_string());
        }

        report.log_summary();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::upstream::{RegionRef, UpstreamEvent, UpstreamLocation};

    fn offline_service() -> SyncService {
        let config = Config::test_default();
        SyncService::new(FirestoreDb::new_mock(), UpstreamClient::new(&config))
    }

    fn gauntlet() -> (UpstreamEvent, UpstreamLocation) {
        let event = UpstreamEvent {
            id: 9,
            name: Some("Gauntlet".to_string()),
            day_of_week: Some("monday".to_string()),
            location_id: Some(5),
            start_time: Some("0530".to_string()),
            end_time: Some("0615".to_string()),
            regions: vec![RegionRef {
                region_id: None,
                region_name: Some("River City".to_string()),
            }],
            ..Default::default()
        };
        let location = UpstreamLocation {
            id: 5,
            latitude: Some(30.1),
            longitude: Some(-81.6),
            ..Default::default()
        };
        (event, location)
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(SyncScope::Full.to_string(), "full");
        assert_eq!(SyncScope::Event(42).to_string(), "event:42");
        assert_eq!(SyncScope::Location(5).to_string(), "location:5");
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_writing() {
        let service = offline_service();
        let (event, location) = gauntlet();

        let report = service
            .apply(
                SyncScope::Full,
                &HashMap::new(),
                &[event],
                &[location],
                "2026-01-01T00:00:00Z",
                true,
            )
            .await;

        assert!(report.dry_run);
        assert!(report.complete);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.writes(), 1);
        assert_eq!(report.changes[0].id, "river-city_gauntlet_monday_9");
        assert_eq!(report.changes[0].kind, ChangeKind::Insert);
        assert_eq!(report.batches_total, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_still_reports() {
        // Offline database: the first batch fails
        let service = offline_service();
        let (event, location) = gauntlet();

        let report = service
            .apply(
                SyncScope::Full,
                &HashMap::new(),
                &[event],
                &[location],
                "2026-01-01T00:00:00Z",
                false,
            )
            .await;

        assert!(!report.complete);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.batches_total, 1);
        assert_eq!(report.batches_committed, 0);
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_soft_delete_reported() {
        let service = offline_service();
        let mut stored = HashMap::new();
        stored.insert(
            "river-city_bravo_monday_2".to_string(),
            Beatdown {
                last_updated: Some("2026-01-01T00:00:00Z".to_string()),
                ..Default::default()
            },
        );

        let report = service
            .apply(SyncScope::Full, &stored, &[], &[], "2026-01-02T00:00:00Z", true)
            .await;

        assert_eq!(report.soft_deleted, 1);
        assert_eq!(report.changes[0].kind, ChangeKind::SoftDelete);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_fails_pass() {
        // test_default points at a closed port; every attempt is a network error
        let service = offline_service();
        let err = service.run(SyncScope::Full, true).await.unwrap_err();
        assert!(err.is_transient());
    }
}
