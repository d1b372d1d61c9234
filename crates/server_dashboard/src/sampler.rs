//! Periodic main-statistics sampling.
//!
//! The sampler reads live values from the host through [`TelemetrySource`]
//! and hands them to the [`Reporter`]. The host keeps ownership of players,
//! worlds and the tick loop.

use crate::reporter::Reporter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Read-only view of the host server used for sampling.
pub trait TelemetrySource: Send + Sync {
    /// Number of players currently online.
    fn online_player_count(&self) -> usize;

    /// Smoothed ticks-per-second figure.
    fn average_tps(&self) -> f64;

    /// Loaded chunks summed over every loaded world, 0 when none is loaded.
    fn loaded_chunk_count(&self) -> usize;
}

/// One reading of the host's main statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub player_count: usize,
    pub tps_average: f64,
    pub loaded_chunk_count: usize,
}

impl TelemetrySample {
    pub fn read(source: &dyn TelemetrySource) -> Self {
        Self {
            player_count: source.online_player_count(),
            tps_average: source.average_tps(),
            loaded_chunk_count: source.loaded_chunk_count(),
        }
    }
}

pub struct TelemetrySampler {
    source: Arc<dyn TelemetrySource>,
    reporter: Arc<Reporter>,
}

impl TelemetrySampler {
    pub fn new(source: Arc<dyn TelemetrySource>, reporter: Arc<Reporter>) -> Self {
        Self { source, reporter }
    }

    /// Samples and dispatches once. Nothing is read from the host while the
    /// gate is closed.
    pub fn tick(&self) -> Option<TelemetrySample> {
        if !self.reporter.gate().is_enabled() {
            return None;
        }

        let sample = TelemetrySample::read(self.source.as_ref());
        self.reporter.send_main_stats(&sample).then_some(sample)
    }

    /// Runs [`tick`](Self::tick) every `period`, the first time one full
    /// period after start, until `shutdown` fires.
    pub fn spawn(self, period: Duration, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("🕒 Main statistics sampler started with period {:?}", period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(sample) = self.tick() {
                            debug!(
                                "📈 Sampled {} players, {:.2} TPS, {} chunks",
                                sample.player_count, sample.tps_average, sample.loaded_chunk_count
                            );
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }

            info!("🛑 Main statistics sampler stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymize::UsernameAnonymizer;
    use crate::dispatcher::Dispatcher;
    use crate::error::TransportError;
    use crate::gate::EnablementGate;
    use crate::http::{HttpClient, HttpResponse};
    use crate::registry::WebhookRegistry;
    use crate::request::{DispatchRequest, Endpoints};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedSource {
        reads: AtomicUsize,
    }

    impl TelemetrySource for FixedSource {
        fn online_player_count(&self) -> usize {
            self.reads.fetch_add(1, Ordering::SeqCst);
            3
        }

        fn average_tps(&self) -> f64 {
            19.8
        }

        fn loaded_chunk_count(&self) -> usize {
            42
        }
    }

    #[derive(Default)]
    struct Recorder {
        bodies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for Recorder {
        async fn execute(&self, request: &DispatchRequest) -> Result<HttpResponse, TransportError> {
            self.bodies
                .lock()
                .unwrap()
                .push(request.body().unwrap_or_default());
            Ok(HttpResponse::new(200, ""))
        }
    }

    fn sampler(enabled: bool) -> (TelemetrySampler, Arc<FixedSource>, Arc<Recorder>, Arc<Reporter>) {
        let source = Arc::new(FixedSource {
            reads: AtomicUsize::new(0),
        });
        let http = Arc::new(Recorder::default());
        let reporter = Arc::new(Reporter::new(
            EnablementGate::with_state(enabled),
            WebhookRegistry::empty(),
            Endpoints::new("http://dash.test", "tok"),
            UsernameAnonymizer::from_secret("tok"),
            Arc::new(Dispatcher::new(http.clone(), 1, 8)),
        ));
        (
            TelemetrySampler::new(source.clone(), reporter.clone()),
            source,
            http,
            reporter,
        )
    }

    #[tokio::test]
    async fn test_tick_dispatches_sample() {
        let (sampler, _, http, reporter) = sampler(true);

        let sample = sampler.tick().unwrap();
        assert_eq!(sample.player_count, 3);
        assert_eq!(sample.loaded_chunk_count, 42);

        reporter.dispatcher().shutdown(Duration::from_secs(1)).await;
        assert_eq!(
            http.bodies.lock().unwrap().as_slice(),
            ["token=tok&playerCount=3&tps=19.8&loadedChunks=42"]
        );
    }

    #[tokio::test]
    async fn test_disabled_tick_reads_nothing() {
        let (sampler, source, http, reporter) = sampler(false);

        assert!(sampler.tick().is_none());
        reporter.dispatcher().shutdown(Duration::from_secs(1)).await;

        assert_eq!(source.reads.load(Ordering::SeqCst), 0);
        assert!(http.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sampler_runs_on_period() {
        let (sampler, source, _http, reporter) = sampler(true);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = sampler.spawn(Duration::from_secs(5), shutdown_rx);

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(source.reads.load(Ordering::SeqCst), 0);

        // Ticks at 5s, 10s and 15s
        tokio::time::sleep(Duration::from_millis(10200)).await;
        assert_eq!(source.reads.load(Ordering::SeqCst), 3);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
        reporter.dispatcher().shutdown(Duration::from_secs(1)).await;
    }
}
