//! Plugin lifecycle.
//!
//! [`DashboardPlugin::start`] performs the blocking startup sequence and only
//! returns a plugin when the token was accepted. Hosts subscribe
//! [`DashboardPlugin::handle_event`] to their event stream and route the
//! `sd-toggle` command to [`DashboardPlugin::handle_command`]; without a
//! plugin value there is nothing to subscribe and no sampler running.

use crate::anonymize::UsernameAnonymizer;
use crate::api::{DashboardApi, ValidationOutcome};
use crate::command::{execute_toggle, CommandOutcome};
use crate::config::DashboardConfig;
use crate::dispatcher::{DispatchStatsSnapshot, Dispatcher};
use crate::error::{DashboardResult, ValidationError};
use crate::events::{EventTranslator, HostEvent};
use crate::gate::EnablementGate;
use crate::http::{HttpClient, ReqwestClient};
use crate::registry::WebhookRegistry;
use crate::reporter::Reporter;
use crate::request::Endpoints;
use crate::sampler::{TelemetrySampler, TelemetrySource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct DashboardPlugin {
    gate: EnablementGate,
    reporter: Arc<Reporter>,
    translator: EventTranslator,
    validation: ValidationOutcome,
    sampler: Option<JoinHandle<()>>,
    shutdown_sender: broadcast::Sender<()>,
    shutdown_grace: Duration,
}

impl DashboardPlugin {
    /// Starts the plugin with the production HTTP client.
    pub async fn start_default(
        config: DashboardConfig,
        gate: EnablementGate,
        source: Arc<dyn TelemetrySource>,
    ) -> DashboardResult<Self> {
        let http = match ReqwestClient::new(config.request_timeout()) {
            Ok(client) => client,
            Err(e) => {
                gate.disable();
                error!("❌ Couldn't initialise ServerDashboard: {}", e);
                return Err(ValidationError::Unreachable(e).into());
            }
        };
        Self::start(config, gate, Arc::new(http), source).await
    }

    /// Validates configuration and token, fetches the webhook registry,
    /// starts dispatch workers and the sampler, then sends the `enabled`
    /// webhook.
    ///
    /// On error the gate is closed and nothing is left running.
    pub async fn start(
        config: DashboardConfig,
        gate: EnablementGate,
        http: Arc<dyn HttpClient>,
        source: Arc<dyn TelemetrySource>,
    ) -> DashboardResult<Self> {
        match Self::try_start(config, gate.clone(), http, source).await {
            Ok(plugin) => Ok(plugin),
            Err(e) => {
                gate.disable();
                error!("❌ Couldn't initialise ServerDashboard: {}", e);
                Err(e)
            }
        }
    }

    async fn try_start(
        config: DashboardConfig,
        gate: EnablementGate,
        http: Arc<dyn HttpClient>,
        source: Arc<dyn TelemetrySource>,
    ) -> DashboardResult<Self> {
        config.validate()?;

        let endpoints = Endpoints::new(config.base_url(), config.token());
        let api = DashboardApi::new(http.clone(), endpoints.clone());

        let validation = api.validate_token().await?;
        let registry = if gate.is_enabled() {
            api.fetch_enabled_webhooks().await
        } else {
            WebhookRegistry::empty()
        };

        let secret = config
            .anonymization_secret
            .as_deref()
            .unwrap_or_else(|| config.token());
        let dispatcher = Arc::new(Dispatcher::new(
            http,
            config.worker_count,
            config.queue_capacity,
        ));
        let reporter = Arc::new(Reporter::new(
            gate.clone(),
            registry,
            endpoints,
            UsernameAnonymizer::from_secret(secret),
            dispatcher,
        ));

        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let sampler = TelemetrySampler::new(source, reporter.clone())
            .spawn(config.sample_interval(), shutdown_receiver);

        let translator = EventTranslator::new(reporter.clone());
        translator.handle(&HostEvent::Enabled);

        info!(
            "🚀 ServerDashboard {} started ({} webhooks enabled)",
            crate::api::PLUGIN_VERSION,
            reporter.registry().len()
        );

        Ok(Self {
            gate,
            reporter,
            translator,
            validation,
            sampler: Some(sampler),
            shutdown_sender,
            shutdown_grace: config.shutdown_grace(),
        })
    }

    /// Host event callback. Returns whether a request was dispatched.
    pub fn handle_event(&self, event: &HostEvent) -> bool {
        self.translator.handle(event)
    }

    /// Runs the `sd-toggle` admin command.
    pub fn handle_command<S: AsRef<str>>(&self, args: &[S]) -> CommandOutcome {
        execute_toggle(&self.gate, args)
    }

    pub fn gate(&self) -> &EnablementGate {
        &self.gate
    }

    pub fn registry(&self) -> &WebhookRegistry {
        self.reporter.registry()
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    pub fn translator(&self) -> EventTranslator {
        self.translator.clone()
    }

    pub fn validation(&self) -> &ValidationOutcome {
        &self.validation
    }

    pub fn dispatch_stats(&self) -> DispatchStatsSnapshot {
        self.reporter.dispatcher().stats()
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the sampler, sends the `disabled` webhook and drains the
    /// dispatch queue.
    pub async fn shutdown(mut self) -> DispatchStatsSnapshot {
        info!("🛑 Shutting down ServerDashboard...");

        let _ = self.shutdown_sender.send(());
        if let Some(handle) = self.sampler.take() {
            if let Err(e) = handle.await {
                warn!("⚠️ Sampler task ended abnormally: {}", e);
            }
        }

        self.translator.handle(&HostEvent::Disabled);

        self.reporter
            .dispatcher()
            .shutdown(self.shutdown_grace)
            .await
    }
}
