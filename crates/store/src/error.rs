//! Storage error taxonomy.

use thiserror::Error;

/// Result type used across the store layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Local store failure.
///
/// `Unavailable` is fatal for the session (no local cache capability; the
/// app degrades to an empty read-only catalog). `Query` and `Io` are
/// recoverable: callers may retry, except during best-effort sign-out
/// cleanup where failures are logged and swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened at all.
    #[error("local store unavailable: {0}")]
    Unavailable(String),

    /// A statement or transaction failed.
    #[error("local store query failed: {0}")]
    Query(String),

    /// Filesystem-level failure (path resolution, directory creation).
    #[error("local store io failure: {0}")]
    Io(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Query(err.to_string())
    }
}
