use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use claimsync_events::{ChangeListener, CollectionScoped, EventBus, RecordChange, Subscription};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker task failed: {0}")]
    Join(String),
}

/// Counters for one worker's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Notifications taken off the subscription.
    pub received: u64,
    /// Notifications the listener handled successfully.
    pub handled: u64,
    /// Notifications the listener failed on (not retried).
    pub failed: u64,
    /// Notifications ignored (other collection, or not a valid uid).
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    handled: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WorkerStats {
        WorkerStats {
            received: self.received.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Handle to observe, stop and join a background worker.
///
/// Dropping the handle also stops the worker (after draining).
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl WorkerHandle {
    pub fn stats(&self) -> WorkerStats {
        self.counters.snapshot()
    }

    /// Request graceful shutdown and wait for the worker to stop.
    ///
    /// Notifications already queued (including any published while draining)
    /// are handled before the worker exits.
    pub async fn shutdown(mut self) -> Result<WorkerStats, WorkerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.join
            .await
            .map_err(|e| WorkerError::Join(e.to_string()))?;
        Ok(self.counters.snapshot())
    }
}

/// Delivers change notifications to a [`ChangeListener`].
///
/// - Subscribes to a bus at spawn time
/// - Calls the listener once per notification, sequentially, so writes to one
///   document are seen in the order they were published
/// - Optional collection filtering
/// - Failures are logged and counted, never retried
#[derive(Debug)]
pub struct ChangeWorker;

impl ChangeWorker {
    /// Spawn a tokio task that feeds `listener` from a fresh subscription.
    ///
    /// - `collection`: when provided, notifications for other collections are ignored
    /// - `listener`: must tolerate duplicates (at-least-once delivery)
    pub fn spawn<B, L>(
        name: &'static str,
        bus: &B,
        collection: Option<String>,
        listener: L,
    ) -> WorkerHandle
    where
        B: EventBus<RecordChange> + ?Sized,
        L: ChangeListener + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let subscription = bus.subscribe();
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            name,
            collection,
            listener,
            counters: counters.clone(),
        };
        let join = tokio::spawn(worker.run(subscription, shutdown_rx));

        WorkerHandle {
            shutdown: Some(shutdown_tx),
            join,
            counters,
        }
    }
}

struct Worker<L> {
    name: &'static str,
    collection: Option<String>,
    listener: L,
    counters: Arc<Counters>,
}

impl<L> Worker<L>
where
    L: ChangeListener,
{
    async fn run(self, mut subscription: Subscription<RecordChange>, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                next = subscription.recv() => match next {
                    Some(change) => self.dispatch(change).await,
                    None => {
                        debug!(worker = self.name, "bus closed, stopping");
                        return;
                    }
                },
            }
        }

        while let Ok(change) = subscription.try_recv() {
            self.dispatch(change).await;
        }
        debug!(worker = self.name, "change worker stopped");
    }

    async fn dispatch(&self, change: RecordChange) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        if let Some(collection) = &self.collection {
            if change.collection() != collection {
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let uid = match change.uid() {
            Ok(uid) => uid,
            Err(err) => {
                warn!(worker = self.name, event_id = %change.event_id(), error = %err, "change for unusable document id");
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        match self
            .listener
            .on_record_written(change.before(), change.after(), &uid)
            .await
        {
            Ok(()) => {
                self.counters.handled.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                error!(
                    worker = self.name,
                    event_id = %change.event_id(),
                    %uid,
                    error = %err,
                    "change listener failed"
                );
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
