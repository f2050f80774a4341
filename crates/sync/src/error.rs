//! Sync pipeline error taxonomy.

use thiserror::Error;

use gudang_remote::{ConfigError, RemoteFetchError};
use gudang_store::StoreError;

/// Failure of one `run_sync` attempt.
///
/// Exactly one attempt is made per invocation; a manual retry is a fresh
/// call into the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteFetchError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The in-flight sync was cancelled before the fetch completed.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Machine-discriminable kind, paired with the human-readable `Display`
    /// message on the progress observable.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "configuration",
            SyncError::Remote(RemoteFetchError::Timeout) => "timeout",
            SyncError::Remote(RemoteFetchError::NetworkUnreachable(_)) => "network",
            SyncError::Remote(RemoteFetchError::Http { .. }) => "server",
            SyncError::Remote(RemoteFetchError::MalformedPayload(_)) => "payload",
            SyncError::Storage(_) => "storage",
            SyncError::Cancelled => "cancelled",
        }
    }
}
