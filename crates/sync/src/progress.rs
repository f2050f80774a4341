//! Progress and completion notifications for the sync pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stages of one sync run.
///
/// `Error` is reachable from `Fetching`, `Storing`, and `Processing`; after
/// surfacing the failure the orchestrator settles back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Idle,
    Fetching,
    Storing,
    Processing,
    Complete,
    Error,
}

/// One progress notification, emitted at each stage transition.
///
/// `percent` increases monotonically within a run and is informative only;
/// it never drives control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProgress {
    pub phase: SyncPhase,
    pub percent: u8,
    pub message: String,
}

/// Broadcast once a sync generation has committed, so decoupled read views
/// know to re-query the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCompleted {
    pub record_count: u64,
    pub synced_at: DateTime<Utc>,
}
