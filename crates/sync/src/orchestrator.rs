//! Single-writer sync orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use gudang_events::{SubscriberList, Subscription};
use gudang_remote::FetchProducts;
use gudang_store::ProductStore;

use crate::error::SyncError;
use crate::progress::{SyncCompleted, SyncPhase, SyncProgress};

/// Outcome of a `run_sync` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A full fetch/replace cycle ran to completion.
    Completed(SyncReport),
    /// Another sync was already in flight; this call was a no-op. The
    /// in-flight run will produce an equally fresh generation.
    AlreadyRunning,
}

/// Summary of a committed sync generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub record_count: u64,
    pub synced_at: DateTime<Utc>,
}

/// Drives fetch → replace → derive → metadata as one non-reentrant cycle.
///
/// This is the single logical writer: only `run_sync` mutates the product
/// and category collections, and `replace_all` is a destructive bulk
/// replace, so at most one cycle may be in flight at a time.
pub struct SyncOrchestrator {
    store: Arc<ProductStore>,
    remote: Arc<dyn FetchProducts>,
    in_flight: AtomicBool,
    phase: std::sync::Mutex<SyncPhase>,
    last_percent: AtomicU8,
    cancel_requested: AtomicBool,
    cancel: Notify,
    progress: SubscriberList<SyncProgress>,
    completed: SubscriberList<SyncCompleted>,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<ProductStore>, remote: Arc<dyn FetchProducts>) -> Self {
        Self {
            store,
            remote,
            in_flight: AtomicBool::new(false),
            phase: std::sync::Mutex::new(SyncPhase::Idle),
            last_percent: AtomicU8::new(0),
            cancel_requested: AtomicBool::new(false),
            cancel: Notify::new(),
            progress: SubscriberList::new(),
            completed: SubscriberList::new(),
        }
    }

    /// Observe stage transitions of the current/next run.
    pub fn subscribe_progress(&self) -> Subscription<SyncProgress> {
        self.progress.subscribe()
    }

    /// Observe committed sync generations.
    pub fn subscribe_completed(&self) -> Subscription<SyncCompleted> {
        self.completed.subscribe()
    }

    /// Current stage of the orchestrator.
    pub fn phase(&self) -> SyncPhase {
        self.phase.lock().map(|p| *p).unwrap_or(SyncPhase::Idle)
    }

    /// Reset transient progress/error state back to idle (sign-out path).
    pub fn reset(&self) {
        self.set_phase(SyncPhase::Idle);
        self.last_percent.store(0, Ordering::SeqCst);
    }

    /// Abort the in-flight fetch, if any.
    ///
    /// Only the network stage is cancellable; the store transaction is
    /// atomic and short, so it is never interrupted mid-flight.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        self.cancel.notify_one();
    }

    /// Drive one sync cycle: fetch the remote batch, replace the local
    /// catalog (products, derived categories, and metadata in one
    /// transaction), then broadcast completion.
    ///
    /// Not reentrant: a call that finds a cycle already in flight is ignored
    /// and returns `SyncOutcome::AlreadyRunning`. On failure the error's
    /// message and kind are surfaced on the progress observable and the
    /// orchestrator returns to `Idle`; there is no automatic retry.
    pub async fn run_sync(&self) -> Result<SyncOutcome, SyncError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("sync already in flight; ignoring run_sync call");
            return Ok(SyncOutcome::AlreadyRunning);
        }

        self.cancel_requested.store(false, Ordering::SeqCst);
        let result = self.run_cycle().await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_cycle(&self) -> Result<SyncOutcome, SyncError> {
        self.transition(SyncPhase::Fetching, 10, "fetching finished goods from ERP");

        let fetch = self.remote.fetch_batch();
        tokio::pin!(fetch);
        let batch = loop {
            tokio::select! {
                res = &mut fetch => break res.map_err(SyncError::from),
                _ = self.cancel.notified() => {
                    if self.cancel_requested.load(Ordering::SeqCst) {
                        break Err(SyncError::Cancelled);
                    }
                    // Stale wakeup from an earlier cancel; keep waiting.
                }
            }
        };
        let batch = match batch {
            Ok(batch) => batch,
            Err(err) => return self.fail(err),
        };
        if self.cancel_requested.load(Ordering::SeqCst) {
            return self.fail(SyncError::Cancelled);
        }

        if let Some(reported) = batch.reported_count {
            if reported != batch.products.len() as u64 {
                tracing::warn!(
                    reported,
                    received = batch.products.len(),
                    "ERP row-count does not match received records"
                );
            }
        }

        self.transition(SyncPhase::Storing, 55, "replacing local catalog");
        let meta = match self.store.replace_all(&batch.products).await {
            Ok(meta) => meta,
            Err(err) => return self.fail(SyncError::from(err)),
        };

        self.transition(SyncPhase::Processing, 85, "publishing refreshed catalog");
        self.completed.publish(SyncCompleted {
            record_count: meta.record_count,
            synced_at: meta.synced_at,
        });

        self.transition(SyncPhase::Complete, 100, "sync complete");
        Ok(SyncOutcome::Completed(SyncReport {
            record_count: meta.record_count,
            synced_at: meta.synced_at,
        }))
    }

    fn fail(&self, err: SyncError) -> Result<SyncOutcome, SyncError> {
        tracing::error!(kind = err.kind(), "sync failed: {err}");
        self.progress.publish(SyncProgress {
            phase: SyncPhase::Error,
            percent: self.last_percent.load(Ordering::SeqCst),
            message: err.to_string(),
        });
        self.set_phase(SyncPhase::Idle);
        Err(err)
    }

    fn transition(&self, phase: SyncPhase, percent: u8, message: &str) {
        self.set_phase(phase);
        self.last_percent.store(percent, Ordering::SeqCst);
        tracing::info!(?phase, percent, "{message}");
        self.progress.publish(SyncProgress {
            phase,
            percent,
            message: message.to_string(),
        });
    }

    fn set_phase(&self, phase: SyncPhase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use gudang_core::{CategoryId, Product, ProductId};
    use gudang_remote::{ProductBatch, RemoteFetchError};

    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId(id),
            code: format!("FG-{id:04}"),
            name: name.to_string(),
            category_id: CategoryId(10),
            category_name: "BERAS".to_string(),
            parent1: "FINISHED GOODS".to_string(),
            parent2: "FOOD".to_string(),
            weight: 5.0,
            small_uom: "KG".to_string(),
            big_uom: "SAK".to_string(),
        }
    }

    /// Returns a fixed batch immediately, counting calls.
    struct OkFetcher {
        calls: AtomicUsize,
        products: Vec<Product>,
    }

    #[async_trait]
    impl FetchProducts for OkFetcher {
        async fn fetch_batch(&self) -> Result<ProductBatch, RemoteFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProductBatch {
                products: self.products.clone(),
                reported_count: Some(self.products.len() as u64),
            })
        }
    }

    /// Blocks until the test releases a permit, counting calls.
    struct GatedFetcher {
        calls: Arc<AtomicUsize>,
        gate: Arc<Semaphore>,
        products: Vec<Product>,
    }

    #[async_trait]
    impl FetchProducts for GatedFetcher {
        async fn fetch_batch(&self) -> Result<ProductBatch, RemoteFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.expect("gate closed");
            Ok(ProductBatch {
                products: self.products.clone(),
                reported_count: None,
            })
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl FetchProducts for FailingFetcher {
        async fn fetch_batch(&self) -> Result<ProductBatch, RemoteFetchError> {
            Err(RemoteFetchError::Http {
                status: 500,
                message: "upstream exploded".to_string(),
            })
        }
    }

    async fn wait_for_phase(orchestrator: &SyncOrchestrator, phase: SyncPhase) {
        for _ in 0..400 {
            if orchestrator.phase() == phase {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for phase {phase:?}");
    }

    #[tokio::test]
    async fn run_sync_replaces_store_and_broadcasts_completion() {
        let store = Arc::new(ProductStore::in_memory());
        let remote = Arc::new(OkFetcher {
            calls: AtomicUsize::new(0),
            products: vec![product(1, "BERAS MENIR 5KG"), product(2, "BERAS PREMIUM")],
        });
        let orchestrator = SyncOrchestrator::new(store.clone(), remote.clone());

        let progress = orchestrator.subscribe_progress();
        let completed = orchestrator.subscribe_completed();

        let outcome = orchestrator.run_sync().await.unwrap();
        let SyncOutcome::Completed(report) = outcome else {
            panic!("expected a completed sync");
        };
        assert_eq!(report.record_count, 2);

        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(orchestrator.phase(), SyncPhase::Complete);

        let event = completed.try_recv().unwrap();
        assert_eq!(event.record_count, 2);

        let mut updates = Vec::new();
        while let Ok(update) = progress.try_recv() {
            updates.push(update);
        }
        let phases: Vec<SyncPhase> = updates.iter().map(|u| u.phase).collect();
        assert_eq!(
            phases,
            vec![
                SyncPhase::Fetching,
                SyncPhase::Storing,
                SyncPhase::Processing,
                SyncPhase::Complete
            ]
        );
        let percents: Vec<u8> = updates.iter().map(|u| u.percent).collect();
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_sync_while_in_flight_is_a_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(ProductStore::in_memory());
        let remote = Arc::new(GatedFetcher {
            calls: calls.clone(),
            gate: gate.clone(),
            products: vec![product(1, "BERAS MENIR 5KG")],
        });
        let orchestrator = Arc::new(SyncOrchestrator::new(store.clone(), remote));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.run_sync().await })
        };
        wait_for_phase(&orchestrator, SyncPhase::Fetching).await;

        let second = orchestrator.run_sync().await.unwrap();
        assert_eq!(second, SyncOutcome::AlreadyRunning);

        gate.add_permits(1);
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SyncOutcome::Completed(_)));

        // Only the first call reached the network.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_error_and_returns_to_idle() {
        let store = Arc::new(ProductStore::in_memory());
        let orchestrator = SyncOrchestrator::new(store.clone(), Arc::new(FailingFetcher));
        let progress = orchestrator.subscribe_progress();

        let err = orchestrator.run_sync().await.unwrap_err();
        assert_eq!(err.kind(), "server");
        assert_eq!(orchestrator.phase(), SyncPhase::Idle);

        let mut last = None;
        while let Ok(update) = progress.try_recv() {
            last = Some(update);
        }
        let last = last.unwrap();
        assert_eq!(last.phase, SyncPhase::Error);
        assert!(last.message.contains("500"));

        // Nothing was written.
        assert!(store.get_metadata().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_aborts_the_in_flight_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(ProductStore::in_memory());
        let remote = Arc::new(GatedFetcher {
            calls: calls.clone(),
            gate,
            products: vec![product(1, "BERAS MENIR 5KG")],
        });
        let orchestrator = Arc::new(SyncOrchestrator::new(store.clone(), remote));

        let run = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.run_sync().await })
        };
        wait_for_phase(&orchestrator, SyncPhase::Fetching).await;

        orchestrator.cancel();

        let err = run.await.unwrap().unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(orchestrator.phase(), SyncPhase::Idle);
        assert!(store.get_all().await.unwrap().is_empty());

        // A fresh run after cancellation is allowed again.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
