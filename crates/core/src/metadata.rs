//! Last-sync bookkeeping and the freshness policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum age before the cached catalog is considered stale.
///
/// A sign-in that finds metadata older than this (or no metadata at all)
/// triggers an automatic resync.
pub fn freshness_threshold() -> Duration {
    Duration::hours(1)
}

/// Record of the last successful sync (singleton).
///
/// Upserted at the end of every successful sync, read to decide whether a new
/// sync is needed, destroyed on wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub synced_at: DateTime<Utc>,
    pub record_count: u64,
}

impl SyncMetadata {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.synced_at)
    }

    /// Whether the catalog is older than the given threshold.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.age(now) > threshold
    }
}

/// Whether a sign-in should trigger a resync. Absent metadata counts as stale.
pub fn needs_sync(meta: Option<&SyncMetadata>, now: DateTime<Utc>, threshold: Duration) -> bool {
    meta.is_none_or(|m| m.is_stale(now, threshold))
}
