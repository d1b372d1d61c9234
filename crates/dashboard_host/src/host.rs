//! Simulated game server.
//!
//! Keeps the online player list and loaded worlds, and runs a tick loop whose
//! measured rate feeds the TPS average. Implements [`TelemetrySource`] for the
//! dashboard sampler.

use crate::config::HostSettings;
use dashmap::{DashMap, DashSet};
use server_dashboard::TelemetrySource;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// Number of recent ticks the TPS average is computed over
const TPS_WINDOW: usize = 100;

pub struct SimulatedHost {
    players: DashSet<String>,
    worlds: DashMap<String, usize>,
    tick_interval: Duration,
    /// f64 bits of the current TPS average
    tps_average: AtomicU64,
}

impl SimulatedHost {
    pub fn new(settings: &HostSettings) -> Self {
        let tick_interval = Duration::from_millis(settings.tick_interval_ms.max(1));
        let host = Self {
            players: DashSet::new(),
            worlds: DashMap::new(),
            tick_interval,
            tps_average: AtomicU64::new(0),
        };
        host.store_tps(host.target_tps());

        for world in &settings.worlds {
            host.worlds.insert(world.name.clone(), world.loaded_chunks);
        }
        host
    }

    pub fn target_tps(&self) -> f64 {
        1.0 / self.tick_interval.as_secs_f64()
    }

    /// Returns false if the player was already online.
    pub fn join(&self, name: &str) -> bool {
        self.players.insert(name.to_string())
    }

    /// Returns false if the player was not online.
    pub fn quit(&self, name: &str) -> bool {
        self.players.remove(name).is_some()
    }

    /// Sets the loaded chunk count of a world, loading the world if needed.
    pub fn set_loaded_chunks(&self, world: &str, chunks: usize) {
        self.worlds.insert(world.to_string(), chunks);
    }

    /// Unloads a world. Returns false if it was not loaded.
    pub fn unload_world(&self, world: &str) -> bool {
        self.worlds.remove(world).is_some()
    }

    fn store_tps(&self, tps: f64) {
        self.tps_average.store(tps.to_bits(), Ordering::Relaxed);
    }

    /// Runs the server tick loop until `shutdown` fires.
    pub fn spawn_tick_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut window = TickWindow::new(TPS_WINDOW);
            let mut tick_count: u64 = 0;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tick_count += 1;
                        if let Some(tps) = window.record(Instant::now()) {
                            self.store_tps(tps.min(self.target_tps()));
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }

            debug!("Host tick loop stopped after {} ticks", tick_count);
        })
    }
}

impl TelemetrySource for SimulatedHost {
    fn online_player_count(&self) -> usize {
        self.players.len()
    }

    fn average_tps(&self) -> f64 {
        let tps = f64::from_bits(self.tps_average.load(Ordering::Relaxed));
        (tps * 100.0).round() / 100.0
    }

    fn loaded_chunk_count(&self) -> usize {
        self.worlds.iter().map(|world| *world.value()).sum()
    }
}

/// Sliding window of tick timestamps.
struct TickWindow {
    capacity: usize,
    ticks: VecDeque<Instant>,
}

impl TickWindow {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            ticks: VecDeque::with_capacity(capacity),
        }
    }

    /// Records a tick and returns the average rate over the window once it
    /// holds at least two ticks.
    fn record(&mut self, at: Instant) -> Option<f64> {
        if self.ticks.len() == self.capacity {
            self.ticks.pop_front();
        }
        self.ticks.push_back(at);

        let first = *self.ticks.front()?;
        let elapsed = at.duration_since(first).as_secs_f64();
        if self.ticks.len() < 2 || elapsed <= 0.0 {
            return None;
        }
        Some((self.ticks.len() - 1) as f64 / elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldSettings;

    fn settings() -> HostSettings {
        HostSettings {
            tick_interval_ms: 50,
            worlds: vec![
                WorldSettings {
                    name: "world".to_string(),
                    loaded_chunks: 40,
                },
                WorldSettings {
                    name: "nether".to_string(),
                    loaded_chunks: 2,
                },
            ],
        }
    }

    #[test]
    fn test_player_tracking() {
        let host = SimulatedHost::new(&settings());

        assert!(host.join("Alice"));
        assert!(!host.join("Alice"));
        assert!(host.join("Bob"));
        assert_eq!(host.online_player_count(), 2);

        assert!(host.quit("Alice"));
        assert!(!host.quit("Alice"));
        assert!(host.join("Alice"));
        assert!(host.quit("Alice"));
        assert_eq!(host.online_player_count(), 1);
    }

    #[test]
    fn test_chunks_summed_over_worlds() {
        let host = SimulatedHost::new(&settings());
        assert_eq!(host.loaded_chunk_count(), 42);

        host.set_loaded_chunks("end", 8);
        assert_eq!(host.loaded_chunk_count(), 50);

        assert!(host.unload_world("world"));
        assert!(host.unload_world("nether"));
        assert!(host.unload_world("end"));
        assert_eq!(host.loaded_chunk_count(), 0);
    }

    #[test]
    fn test_initial_tps_is_target() {
        let host = SimulatedHost::new(&settings());
        assert_eq!(host.target_tps(), 20.0);
        assert_eq!(host.average_tps(), 20.0);
    }

    #[test]
    fn test_tick_window_average() {
        let start = Instant::now();
        let mut window = TickWindow::new(5);

        assert!(window.record(start).is_none());
        let tps = window.record(start + Duration::from_millis(100)).unwrap();
        assert!((tps - 10.0).abs() < 1e-9);

        for i in 2..10 {
            window.record(start + Duration::from_millis(100 * i));
        }
        // Window keeps the last 5 ticks: 4 intervals over 400ms
        let tps = window.record(start + Duration::from_millis(1000)).unwrap();
        assert!((tps - 10.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_loop_measures_tps() {
        let host = Arc::new(SimulatedHost::new(&settings()));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = host.clone().spawn_tick_loop(shutdown_rx);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!((host.average_tps() - 20.0).abs() < 0.5);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
