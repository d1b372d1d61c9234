//! Webhook triggers and the per-session registry of enabled triggers.

use std::collections::HashSet;
use std::fmt;

/// Webhook trigger names understood by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Enabled,
    Disabled,
    LowMemory,
    PlayerChat,
    PlayerJoin,
    PlayerQuit,
    PlayerTransfer,
}

impl Trigger {
    pub const ALL: [Trigger; 7] = [
        Trigger::Enabled,
        Trigger::Disabled,
        Trigger::LowMemory,
        Trigger::PlayerChat,
        Trigger::PlayerJoin,
        Trigger::PlayerQuit,
        Trigger::PlayerTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Enabled => "enabled",
            Trigger::Disabled => "disabled",
            Trigger::LowMemory => "lowMemory",
            Trigger::PlayerChat => "playerChat",
            Trigger::PlayerJoin => "playerJoin",
            Trigger::PlayerQuit => "playerQuit",
            Trigger::PlayerTransfer => "playerTransfer",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triggers the dashboard account has opted into. Built once at startup and
/// never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookRegistry {
    triggers: HashSet<String>,
}

impl WebhookRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a `;`-separated list of trigger names. Blank entries are
    /// ignored, so an empty body yields an empty registry.
    pub fn parse(body: &str) -> Self {
        body.split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn contains(&self, trigger: &str) -> bool {
        self.triggers.contains(trigger)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Trigger names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.triggers.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for WebhookRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            triggers: iter.into_iter().map(Into::into).collect(),
        }
    }
}
