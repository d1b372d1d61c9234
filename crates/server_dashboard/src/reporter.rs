//! Gated senders for every runtime dashboard call.
//!
//! Each method checks the enablement gate before it builds a request, so no
//! [`DispatchRequest`](crate::request::DispatchRequest) exists while the
//! plugin is disabled.

use crate::anonymize::UsernameAnonymizer;
use crate::dispatcher::Dispatcher;
use crate::gate::EnablementGate;
use crate::registry::WebhookRegistry;
use crate::request::Endpoints;
use crate::sampler::TelemetrySample;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct Reporter {
    gate: EnablementGate,
    registry: WebhookRegistry,
    endpoints: Endpoints,
    anonymizer: UsernameAnonymizer,
    dispatcher: Arc<Dispatcher>,
}

impl Reporter {
    pub fn new(
        gate: EnablementGate,
        registry: WebhookRegistry,
        endpoints: Endpoints,
        anonymizer: UsernameAnonymizer,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            gate,
            registry,
            endpoints,
            anonymizer,
            dispatcher,
        }
    }

    pub fn gate(&self) -> &EnablementGate {
        &self.gate
    }

    pub fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Sends the main statistics. Returns whether a request was dispatched.
    pub fn send_main_stats(&self, sample: &TelemetrySample) -> bool {
        if !self.gate.is_enabled() {
            return false;
        }

        trace!(
            "Main statistics: {} players, {:.2} TPS, {} chunks",
            sample.player_count,
            sample.tps_average,
            sample.loaded_chunk_count
        );
        self.dispatcher.dispatch(self.endpoints.main_statistics(sample));
        true
    }

    /// Sends the anonymized username and device OS of a connecting player.
    pub fn send_player_stats(&self, username: &str, device_os: &str) -> bool {
        if !self.gate.is_enabled() {
            return false;
        }

        let digest = self.anonymizer.anonymize(username);
        self.dispatcher
            .dispatch(self.endpoints.player_statistics(&digest, device_os));
        true
    }

    /// Sends a webhook trigger if the account enabled it. An empty `arg` is
    /// not transmitted.
    pub fn send_webhook(&self, trigger: &str, arg: &str) -> bool {
        if !self.gate.is_enabled() {
            return false;
        }
        if !self.registry.contains(trigger) {
            trace!("Webhook {} not enabled for this server", trigger);
            return false;
        }

        debug!("🔔 Webhook {}", trigger);
        self.dispatcher.dispatch(self.endpoints.send_webhook(trigger, arg));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpClient, HttpResponse};
    use crate::request::{DispatchRequest, PLAYER_STATISTICS_PATH};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<DispatchRequest>>,
    }

    #[async_trait]
    impl HttpClient for Recorder {
        async fn execute(&self, request: &DispatchRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(HttpResponse::new(200, ""))
        }
    }

    fn reporter(http: Arc<Recorder>, enabled: bool, registry: &str) -> Reporter {
        Reporter::new(
            EnablementGate::with_state(enabled),
            WebhookRegistry::parse(registry),
            Endpoints::new("http://dash.test", "tok"),
            UsernameAnonymizer::from_secret("tok"),
            Arc::new(Dispatcher::new(http, 1, 16)),
        )
    }

    async fn drain(reporter: &Reporter) {
        reporter.dispatcher().shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_disabled_gate_sends_nothing() {
        let http = Arc::new(Recorder::default());
        let reporter = reporter(http.clone(), false, "enabled;playerJoin");
        let sample = TelemetrySample {
            player_count: 1,
            tps_average: 20.0,
            loaded_chunk_count: 10,
        };

        assert!(!reporter.send_main_stats(&sample));
        assert!(!reporter.send_player_stats("Alice", "7"));
        assert!(!reporter.send_webhook("playerJoin", "Alice"));
        drain(&reporter).await;

        assert!(http.requests.lock().unwrap().is_empty());
        assert_eq!(reporter.dispatcher().stats().submitted, 0);
    }

    #[tokio::test]
    async fn test_unregistered_trigger_sends_nothing() {
        let http = Arc::new(Recorder::default());
        let reporter = reporter(http.clone(), true, "enabled");

        assert!(!reporter.send_webhook("playerQuit", "Bob"));
        drain(&reporter).await;

        assert!(http.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_player_stats_never_sends_raw_username() {
        let http = Arc::new(Recorder::default());
        let reporter = reporter(http.clone(), true, "");

        assert!(reporter.send_player_stats("Alice", "Android"));
        drain(&reporter).await;

        let requests = http.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with(PLAYER_STATISTICS_PATH));

        let form = requests[0].form.as_ref().unwrap();
        let username = form.get("username").unwrap();
        assert_ne!(username, "Alice");
        assert_eq!(username, UsernameAnonymizer::from_secret("tok").anonymize("Alice"));
        assert_eq!(form.get("deviceOS"), Some("Android"));
        assert!(!requests[0].body().unwrap().contains("Alice"));
    }

    #[tokio::test]
    async fn test_gate_change_applies_to_next_send() {
        let http = Arc::new(Recorder::default());
        let reporter = reporter(http.clone(), true, "lowMemory");

        assert!(reporter.send_webhook("lowMemory", ""));
        reporter.gate().disable();
        assert!(!reporter.send_webhook("lowMemory", ""));
        drain(&reporter).await;

        assert_eq!(http.requests.lock().unwrap().len(), 1);
    }
}
