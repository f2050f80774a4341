//! Tracing/logging initialization.
//!
//! Every crate in this workspace logs through `tracing` macros; the sync
//! pipeline and store tag their events with structured fields (`records`,
//! `kind`, `percent`). Filtering follows `RUST_LOG`, defaulting to `info`,
//! so `RUST_LOG=gudang_sync=debug` narrows in on one crate.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process. Binaries call this before
/// touching the store or the network.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
