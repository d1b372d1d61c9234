//! Host events and their translation into dashboard calls.

use crate::registry::Trigger;
use crate::reporter::Reporter;
use std::sync::Arc;

/// Notifications the host delivers to the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The plugin finished starting.
    Enabled,
    /// The plugin or the server is shutting down.
    Disabled,
    /// The host raised a low-memory condition.
    LowMemory,
    PlayerChat { format: String },
    PlayerJoin { name: String },
    PlayerQuit { name: String },
    PlayerTransfer { address: String },
    /// A raw login packet, carrying the client's reported device OS.
    Login { username: String, device_os: String },
}

/// A webhook trigger and its optional argument. An empty `arg` means none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub name: String,
    pub arg: String,
}

impl TriggerEvent {
    pub fn new(trigger: Trigger) -> Self {
        Self::with_arg(trigger, "")
    }

    pub fn with_arg(trigger: Trigger, arg: impl Into<String>) -> Self {
        Self {
            name: trigger.as_str().to_string(),
            arg: arg.into(),
        }
    }
}

/// Where a host event ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Webhook(TriggerEvent),
    PlayerStats { username: String, device_os: String },
}

impl HostEvent {
    pub fn route(&self) -> Route {
        match self {
            HostEvent::Enabled => Route::Webhook(TriggerEvent::new(Trigger::Enabled)),
            HostEvent::Disabled => Route::Webhook(TriggerEvent::new(Trigger::Disabled)),
            HostEvent::LowMemory => Route::Webhook(TriggerEvent::new(Trigger::LowMemory)),
            HostEvent::PlayerChat { format } => {
                Route::Webhook(TriggerEvent::with_arg(Trigger::PlayerChat, format.as_str()))
            }
            HostEvent::PlayerJoin { name } => {
                Route::Webhook(TriggerEvent::with_arg(Trigger::PlayerJoin, name.as_str()))
            }
            HostEvent::PlayerQuit { name } => {
                Route::Webhook(TriggerEvent::with_arg(Trigger::PlayerQuit, name.as_str()))
            }
            HostEvent::PlayerTransfer { address } => {
                Route::Webhook(TriggerEvent::with_arg(Trigger::PlayerTransfer, address.as_str()))
            }
            HostEvent::Login {
                username,
                device_os,
            } => Route::PlayerStats {
                username: username.clone(),
                device_os: device_os.clone(),
            },
        }
    }
}

/// Turns host events into gated dashboard calls.
#[derive(Clone)]
pub struct EventTranslator {
    reporter: Arc<Reporter>,
}

impl EventTranslator {
    pub fn new(reporter: Arc<Reporter>) -> Self {
        Self { reporter }
    }

    /// Returns whether a request was dispatched.
    pub fn handle(&self, event: &HostEvent) -> bool {
        if !self.reporter.gate().is_enabled() {
            return false;
        }

        match event.route() {
            Route::Webhook(trigger) => self.reporter.send_webhook(&trigger.name, &trigger.arg),
            Route::PlayerStats {
                username,
                device_os,
            } => self.reporter.send_player_stats(&username, &device_os),
        }
    }
}
