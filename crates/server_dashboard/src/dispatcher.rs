//! Fire-and-forget request dispatch.
//!
//! Requests are pushed onto a bounded queue and executed by a fixed pool of
//! worker tasks. Submitting never waits: when the queue is full or closed the
//! request is dropped with a warning. Failed sends are logged and dropped,
//! there is no retry and no redelivery.

use crate::http::HttpClient;
use crate::request::DispatchRequest;
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters describing what happened to submitted requests.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStatsSnapshot {
    pub submitted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Bounded queue plus worker pool executing [`DispatchRequest`]s.
///
/// Must be created from within a Tokio runtime. Shared by reference between
/// the sampler task and host callbacks; [`Dispatcher::shutdown`] closes it
/// for everyone.
pub struct Dispatcher {
    sender: RwLock<Option<mpsc::Sender<DispatchRequest>>>,
    workers: StdMutex<Vec<JoinHandle<()>>>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    pub fn new(http: Arc<dyn HttpClient>, worker_count: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(DispatchStats::default());

        let workers = (0..worker_count.max(1))
            .map(|id| {
                let receiver = receiver.clone();
                let http = http.clone();
                let stats = stats.clone();
                tokio::spawn(async move {
                    loop {
                        // Only one idle worker waits on the queue at a time
                        let next = receiver.lock().await.recv().await;
                        let Some(request) = next else { break };

                        match http.execute(&request).await {
                            Ok(response) if response.is_success() => {
                                stats.delivered.fetch_add(1, Ordering::Relaxed);
                                debug!("📤 {} {} -> {}", request.method, request.url, response.status);
                            }
                            Ok(response) => {
                                stats.failed.fetch_add(1, Ordering::Relaxed);
                                warn!(
                                    "⚠️ Dashboard request {} {} returned HTTP {}",
                                    request.method, request.url, response.status
                                );
                            }
                            Err(e) => {
                                stats.failed.fetch_add(1, Ordering::Relaxed);
                                warn!("⚠️ Dashboard request {} {} failed: {}", request.method, request.url, e);
                            }
                        }
                    }
                    debug!("Dispatch worker {} stopped", id);
                })
            })
            .collect();

        Self {
            sender: RwLock::new(Some(sender)),
            workers: StdMutex::new(workers),
            stats,
        }
    }

    /// Queues a request without waiting. Never reports errors to the caller.
    pub fn dispatch(&self, request: DispatchRequest) {
        let sender = self.sender.read().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = sender.as_ref() else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("⚠️ Dispatcher stopped, dropping {} {}", request.method, request.url);
            return;
        };

        match sender.try_send(request) {
            Ok(()) => {
                self.stats.submitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(request)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("⚠️ Dispatch queue full, dropping {} {}", request.method, request.url);
            }
            Err(TrySendError::Closed(request)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("⚠️ Dispatcher stopped, dropping {} {}", request.method, request.url);
            }
        }
    }

    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Closes the queue and waits up to `grace` for queued requests to finish.
    /// Workers still running after that are aborted. Later calls to
    /// [`Dispatcher::dispatch`] drop their request.
    pub async fn shutdown(&self, grace: Duration) -> DispatchStatsSnapshot {
        self.sender.write().unwrap_or_else(|e| e.into_inner()).take();
        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));

        let aborts: Vec<_> = workers.iter().map(JoinHandle::abort_handle).collect();
        if tokio::time::timeout(grace, join_all(workers)).await.is_err() {
            warn!("⏱️ Dispatch queue did not drain within {:?}, aborting workers", grace);
            for handle in aborts {
                handle.abort();
            }
        }

        let snapshot = self.stats.snapshot();
        info!(
            "📊 Dispatcher stopped: {} submitted, {} delivered, {} failed, {} dropped",
            snapshot.submitted, snapshot.delivered, snapshot.failed, snapshot.dropped
        );
        snapshot
    }
}
