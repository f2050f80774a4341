//! Couples the sync pipeline to authentication and page lifecycle events.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

use gudang_core::{freshness_threshold, needs_sync};
use gudang_store::ProductStore;

use crate::auth::{AuthState, AuthStateSource};
use crate::orchestrator::SyncOrchestrator;

/// Authentication phase as tracked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unknown,
    SignedOut,
    SignedIn,
}

/// Events the lifecycle manager reacts to.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// The identity provider reported a new auth state.
    Auth(AuthState),
    /// The hosting tab/window became hidden.
    TabHidden,
    /// The page/host is unloading; release the store handle, mutate nothing.
    PageUnload,
}

/// Handle for pushing lifecycle events into a started manager task.
#[derive(Clone)]
pub struct LifecycleHandle {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
    shutdown: Arc<Notify>,
}

impl LifecycleHandle {
    pub fn tab_hidden(&self) {
        let _ = self.tx.send(LifecycleEvent::TabHidden);
    }

    pub fn page_unload(&self) {
        let _ = self.tx.send(LifecycleEvent::PageUnload);
    }

    /// Request graceful shutdown of the manager task.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Subscribes to auth-state transitions and drives the store/orchestrator:
/// populate on sign-in (when the cache is stale), purge on sign-out, purge
/// on tab-hidden-while-signed-out, release the handle on unload.
///
/// Owns no retry/backoff scheduling: a user-triggered manual retry is simply
/// another `run_sync()` call on the orchestrator.
pub struct LifecycleManager {
    store: Arc<ProductStore>,
    orchestrator: Arc<SyncOrchestrator>,
    phase: AuthPhase,
    freshness: Duration,
}

impl LifecycleManager {
    pub fn new(store: Arc<ProductStore>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
            phase: AuthPhase::Unknown,
            freshness: freshness_threshold(),
        }
    }

    /// Override the freshness threshold (defaults to one hour).
    pub fn with_freshness_threshold(mut self, threshold: Duration) -> Self {
        self.freshness = threshold;
        self
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// Spawn the driver task, subscribed to the given auth source.
    ///
    /// The auth subscription stays alive for the task's lifetime; the
    /// returned handle feeds visibility/unload events in and can request
    /// shutdown.
    pub fn start(mut self, source: &dyn AuthStateSource) -> (LifecycleHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());
        let handle = LifecycleHandle {
            tx: tx.clone(),
            shutdown: shutdown.clone(),
        };

        let forward = tx;
        let subscription = source.subscribe(Arc::new(move |state| {
            let _ = forward.send(LifecycleEvent::Auth(state));
        }));

        let task = tokio::spawn(async move {
            let _subscription = subscription;
            tracing::info!("lifecycle manager started");

            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        tracing::info!("lifecycle manager received shutdown signal");
                        break;
                    }
                    event = rx.recv() => {
                        match event {
                            Some(event) => self.handle_event(event).await,
                            None => break,
                        }
                    }
                }
            }

            tracing::info!("lifecycle manager stopped");
        });

        (handle, task)
    }

    /// Apply one lifecycle event. Exposed so embedders without a spawned
    /// task (and tests) can drive the manager directly.
    pub async fn handle_event(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Auth(state) => self.handle_auth(state).await,
            LifecycleEvent::TabHidden => {
                if self.phase == AuthPhase::SignedOut {
                    // Covers the race where sign-out happened but its wipe
                    // had not completed before the tab went hidden. Before
                    // auth resolves the cache may belong to a valid session,
                    // so `Unknown` is left alone.
                    tracing::debug!("tab hidden while signed out; purging defensively");
                    self.purge().await;
                }
            }
            LifecycleEvent::PageUnload => {
                self.store.close().await;
            }
        }
    }

    async fn handle_auth(&mut self, state: AuthState) {
        if !state.loaded {
            // Provider still resolving; stay in Unknown.
            return;
        }

        if state.signed_in {
            let previous = self.phase;
            self.phase = AuthPhase::SignedIn;
            if previous != AuthPhase::SignedIn {
                self.on_sign_in().await;
            }
        } else {
            let previous = self.phase;
            self.phase = AuthPhase::SignedOut;
            if previous != AuthPhase::SignedOut {
                tracing::info!("signed out; purging local catalog");
                self.purge().await;
                self.orchestrator.reset();
            }
        }
    }

    async fn on_sign_in(&self) {
        let meta = match self.store.get_metadata().await {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!("failed to read sync metadata on sign-in: {err}");
                None
            }
        };

        if needs_sync(meta.as_ref(), Utc::now(), self.freshness) {
            tracing::info!("local catalog absent or stale; starting sync");
            if let Err(err) = self.orchestrator.run_sync().await {
                // Already surfaced on the progress observable; the user can
                // retry manually from there.
                tracing::error!(kind = err.kind(), "sign-in sync failed: {err}");
            }
        } else {
            tracing::debug!("local catalog fresh; skipping sync");
        }
    }

    /// Best-effort purge: wipe, falling back to a full destroy. Cleanup
    /// failures are logged and swallowed, never surfaced to the user.
    async fn purge(&self) {
        if let Err(err) = self.store.wipe().await {
            tracing::warn!("wipe failed during cleanup, destroying store: {err}");
            self.store.destroy().await;
        }
    }
}
