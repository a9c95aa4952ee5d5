//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{BatchWriteResult, FirestoreDb};

/// Collection names as constants.
pub mod collections {
    /// Synchronized beatdowns (keyed by derived document ID)
    pub const BEATDOWNS: &str = "beatdowns";
    /// Every received webhook with its processing outcome
    pub const WEBHOOK_LOGS: &str = "webhook_logs";
}
