//! Sync orchestration and lifecycle coupling.
//!
//! The orchestrator drives one fetch/replace/derive cycle at a time against
//! the local store; the lifecycle manager couples that cycle to
//! authentication state (populate on sign-in when stale, purge on sign-out)
//! and to page visibility events.

pub mod auth;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod progress;

pub use auth::{AuthListener, AuthState, AuthStateSource, AuthSubscription, ManualAuthSource};
pub use error::SyncError;
pub use lifecycle::{AuthPhase, LifecycleEvent, LifecycleHandle, LifecycleManager};
pub use orchestrator::{SyncOrchestrator, SyncOutcome, SyncReport};
pub use progress::{SyncCompleted, SyncPhase, SyncProgress};
