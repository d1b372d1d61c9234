//! # Server Dashboard
//!
//! A game-server plugin that forwards telemetry to the Server Dashboard API:
//! periodic main statistics (online players, TPS, loaded chunks), webhook
//! triggers for player and server events, and anonymized per-login device
//! statistics.
//!
//! ## Architecture
//!
//! * **Startup** - [`DashboardPlugin::start`] checks the token and fetches the
//!   enabled webhooks before anything else runs. A failed check closes the
//!   [`EnablementGate`] for the session.
//! * **Dispatch** - every runtime call is a [`DispatchRequest`] handed to the
//!   [`Dispatcher`], a bounded queue drained by background workers. Callers
//!   never wait on the network and never see transport errors.
//! * **Sampling** - [`TelemetrySampler`] reads a [`TelemetrySource`]
//!   implemented by the host every few seconds.
//! * **Events** - [`EventTranslator`] maps [`HostEvent`]s to webhook triggers
//!   or player statistics.
//! * **Control** - the `sd-toggle` admin command flips the gate at runtime.
//!
//! ## Example
//!
//! ```rust,no_run
//! use server_dashboard::{DashboardConfig, DashboardPlugin, EnablementGate, HostEvent, TelemetrySource};
//! use std::sync::Arc;
//!
//! struct MyServer;
//!
//! impl TelemetrySource for MyServer {
//!     fn online_player_count(&self) -> usize { 0 }
//!     fn average_tps(&self) -> f64 { 20.0 }
//!     fn loaded_chunk_count(&self) -> usize { 0 }
//! }
//!
//! # async fn run() {
//! let config = DashboardConfig::new("my-token", "https://api.serverdashboard.me");
//! let gate = EnablementGate::new();
//!
//! if let Ok(plugin) = DashboardPlugin::start_default(config, gate, Arc::new(MyServer)).await {
//!     plugin.handle_event(&HostEvent::PlayerJoin { name: "Alice".into() });
//!     plugin.shutdown().await;
//! }
//! # }
//! ```

pub mod anonymize;
pub mod api;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod gate;
pub mod http;
pub mod plugin;
pub mod registry;
pub mod reporter;
pub mod request;
pub mod sampler;

pub use anonymize::UsernameAnonymizer;
pub use api::{CheckResponse, DashboardApi, ValidationOutcome, PLUGIN_VERSION};
pub use command::{execute_toggle, CommandOutcome, ToggleAction, TOGGLE_COMMAND};
pub use config::{DashboardConfig, DEFAULT_API_URL};
pub use dispatcher::{DispatchStatsSnapshot, Dispatcher};
pub use error::{
    ConfigError, DashboardError, DashboardResult, ProtocolError, TransportError, ValidationError,
};
pub use events::{EventTranslator, HostEvent, Route, TriggerEvent};
pub use gate::EnablementGate;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use plugin::DashboardPlugin;
pub use registry::{Trigger, WebhookRegistry};
pub use reporter::Reporter;
pub use request::{DispatchRequest, Endpoints, FormBody, Method};
pub use sampler::{TelemetrySample, TelemetrySampler, TelemetrySource};
