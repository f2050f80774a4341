//! Remote fetch failure taxonomy.

use thiserror::Error;

/// Failure of a single fetch round-trip.
///
/// All kinds are recoverable by an explicit user retry; the client itself
/// never retries.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    /// The request deadline (30s) elapsed.
    #[error("ERP request timed out")]
    Timeout,

    /// DNS/connect-level failure before any HTTP exchange happened.
    #[error("ERP unreachable: {0}")]
    NetworkUnreachable(String),

    /// The ERP answered with a non-2xx status.
    #[error("ERP returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The body did not match the expected batch shape.
    #[error("malformed ERP payload: {0}")]
    MalformedPayload(String),
}
