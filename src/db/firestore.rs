// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Beatdowns (full and scoped reads, batched upserts and soft-deletes)
//! - Webhook logs (durable record of every notification received, readable
//!   per event)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Beatdown, WebhookLog, WebhookOutcome};
use crate::services::reconcile::PlannedUpsert;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
pub const BATCH_SIZE: usize = 400;

/// Fields touched by a soft-delete.
const SOFT_DELETE_FIELDS: [&str; 3] = ["deleted", "deletedAt", "lastUpdated"];
/// Fields touched when a webhook finishes processing.
const WEBHOOK_OUTCOME_FIELDS: [&str; 3] = ["outcome", "detail", "completedAt"];

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Beatdown Reads ──────────────────────────────────────────

    /// Load every stored beatdown, keyed by document ID.
    pub async fn list_beatdowns(&self) -> Result<HashMap<String, Beatdown>, AppError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BEATDOWNS)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        collect_beatdowns(docs)
    }

    /// Load stored beatdowns for one upstream event (any ID scheme).
    pub async fn list_beatdowns_for_event(
        &self,
        event_id: i64,
    ) -> Result<HashMap<String, Beatdown>, AppError> {
        self.list_beatdowns_where("eventId", event_id).await
    }

    /// Load stored beatdowns at one upstream location (any ID scheme).
    pub async fn list_beatdowns_for_location(
        &self,
        location_id: i64,
    ) -> Result<HashMap<String, Beatdown>, AppError> {
        self.list_beatdowns_where("locationId", location_id).await
    }

    async fn list_beatdowns_where(
        &self,
        field: &'static str,
        value: i64,
    ) -> Result<HashMap<String, Beatdown>, AppError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BEATDOWNS)
            .filter(move |q| q.for_all([q.field(field).eq(value)]))
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        collect_beatdowns(docs)
    }

    /// Get a single beatdown by document ID.
    pub async fn get_beatdown(&self, doc_id: &str) -> Result<Option<Beatdown>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BEATDOWNS)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Batch Writer ───────────────────────────────────────────

    /// Apply upserts and soft-deletes in transactions of at most `BATCH_SIZE`.
    ///
    /// Each batch commits atomically; batches run one after another and a
    /// failed batch stops the rest. Earlier batches stay committed, which is
    /// safe because reconciliation is idempotent and the next pass picks up
    /// whatever is left.
    pub async fn commit_beatdowns(
        &self,
        upserts: &[PlannedUpsert],
        soft_deletes: &[String],
        now: &str,
    ) -> BatchWriteResult {
        let ops: Vec<WriteOp<'_>> = upserts
            .iter()
            .map(WriteOp::Upsert)
            .chain(soft_deletes.iter().map(|id| WriteOp::SoftDelete(id.as_str())))
            .collect();

        let mut result = BatchWriteResult {
            batches_total: ops.len().div_ceil(BATCH_SIZE),
            ..Default::default()
        };

        for (index, chunk) in ops.chunks(BATCH_SIZE).enumerate() {
            if let Err(e) = self.commit_batch(chunk, now).await {
                tracing::error!(
                    batch = index + 1,
                    batches_total = result.batches_total,
                    error = %e,
                    "Beatdown batch commit failed"
                );
                result.error = Some(e);
                return result;
            }

            result.batches_committed += 1;
            result.writes_committed += chunk.len();
            tracing::debug!(
                batch = index + 1,
                batches_total = result.batches_total,
                writes = chunk.len(),
                "Committed beatdown batch"
            );
        }

        result
    }

    async fn commit_batch(&self, ops: &[WriteOp<'_>], now: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let soft_delete = SoftDelete::at(now);

        for op in ops {
            match op {
                WriteOp::Upsert(upsert) => {
                    client
                        .fluent()
                        .update()
                        .in_col(collections::BEATDOWNS)
                        .document_id(&upsert.id)
                        .object(&upsert.beatdown)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add upsert of {} to transaction: {}",
                                upsert.id, e
                            ))
                        })?;
                }
                WriteOp::SoftDelete(id) => {
                    client
                        .fluent()
                        .update()
                        .fields(SOFT_DELETE_FIELDS)
                        .in_col(collections::BEATDOWNS)
                        .document_id(*id)
                        .object(&soft_delete)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add soft-delete of {} to transaction: {}",
                                id, e
                            ))
                        })?;
                }
            }
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit batch: {}", e)))?;

        Ok(())
    }

    // ─── Webhook Log Operations ─────────────────────────────────

    /// Store a webhook log entry.
    pub async fn set_webhook_log(&self, log_id: &str, log: &WebhookLog) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WEBHOOK_LOGS)
            .document_id(log_id)
            .object(log)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Webhook log entries that named one upstream event.
    pub async fn list_webhook_logs_for_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<WebhookLog>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WEBHOOK_LOGS)
            .filter(move |q| q.for_all([q.field("eventId").eq(event_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record how a logged webhook was handled.
    pub async fn set_webhook_outcome(
        &self,
        log_id: &str,
        outcome: WebhookOutcome,
        detail: Option<String>,
        completed_at: &str,
    ) -> Result<(), AppError> {
        let update = WebhookOutcomeUpdate {
            outcome,
            detail,
            completed_at: completed_at.to_string(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(WEBHOOK_OUTCOME_FIELDS)
            .in_col(collections::WEBHOOK_LOGS)
            .document_id(log_id)
            .object(&update)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// One write in a batch.
enum WriteOp<'a> {
    Upsert(&'a PlannedUpsert),
    SoftDelete(&'a str),
}

/// Field-masked update applied by a soft-delete.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SoftDelete {
    deleted: bool,
    deleted_at: String,
    last_updated: String,
}

impl SoftDelete {
    fn at(now: &str) -> Self {
        Self {
            deleted: true,
            deleted_at: now.to_string(),
            last_updated: now.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookOutcomeUpdate {
    outcome: WebhookOutcome,
    detail: Option<String>,
    completed_at: String,
}

/// Progress of a batched commit.
#[derive(Debug, Default)]
pub struct BatchWriteResult {
    pub batches_total: usize,
    pub batches_committed: usize,
    pub writes_committed: usize,
    /// Set when a batch failed; later batches were not attempted
    pub error: Option<AppError>,
}

impl BatchWriteResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Deserialize raw documents into a map keyed by document ID.
///
/// A document that no longer parses is logged and left out; it is then
/// neither matched nor cleaned up by reconciliation.
fn collect_beatdowns(
    docs: Vec<firestore::FirestoreDocument>,
) -> Result<HashMap<String, Beatdown>, AppError> {
    let mut beatdowns = HashMap::with_capacity(docs.len());

    for doc in docs {
        let Some(doc_id) = document_id(&doc.name) else {
            tracing::warn!(name = %doc.name, "Firestore document without an ID");
            continue;
        };

        match firestore::FirestoreDb::deserialize_doc_to::<Beatdown>(&doc) {
            Ok(beatdown) => {
                beatdowns.insert(doc_id.to_string(), beatdown);
            }
            Err(e) => {
                tracing::warn!(doc_id, error = %e, "Skipping unreadable beatdown document");
            }
        }
    }

    Ok(beatdowns)
}

/// Last path segment of a full Firestore document name.
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}
