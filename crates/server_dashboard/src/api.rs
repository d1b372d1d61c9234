//! Startup calls to the dashboard API: token check and webhook list.
//!
//! Both run once, before the plugin reacts to any host event, and are awaited
//! directly instead of going through the dispatcher because their response
//! bodies decide how the plugin starts.

use crate::error::{ProtocolError, ValidationError};
use crate::http::HttpClient;
use crate::registry::WebhookRegistry;
use crate::request::Endpoints;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Version of this plugin, compared against the latest version the API
/// reports.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of a successful token check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl CheckResponse {
    pub fn parse(body: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// What a successful token check reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Latest plugin version known to the API, if it sent one.
    pub remote_version: Option<String>,
    /// Informational messages from the API, already logged as warnings.
    pub messages: Vec<String>,
    /// Whether `remote_version` differs from [`PLUGIN_VERSION`].
    pub outdated: bool,
}

pub struct DashboardApi {
    http: Arc<dyn HttpClient>,
    endpoints: Endpoints,
    local_version: String,
}

impl DashboardApi {
    pub fn new(http: Arc<dyn HttpClient>, endpoints: Endpoints) -> Self {
        Self::with_version(http, endpoints, PLUGIN_VERSION)
    }

    /// Uses `local_version` instead of the compiled-in plugin version.
    pub fn with_version(
        http: Arc<dyn HttpClient>,
        endpoints: Endpoints,
        local_version: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoints,
            local_version: local_version.into(),
        }
    }

    /// Checks the token. Only HTTP 200 counts as accepted. Remote messages and
    /// the outdated-version notice are logged as warnings and never fail the
    /// check.
    pub async fn validate_token(&self) -> Result<ValidationOutcome, ValidationError> {
        let response = self.http.execute(&self.endpoints.check_token()).await?;
        if response.status != 200 {
            return Err(ValidationError::Rejected {
                status: response.status,
            });
        }

        let check = CheckResponse::parse(&response.body).unwrap_or_else(|e| {
            warn!("⚠️ {}, ignoring check details", e);
            CheckResponse::default()
        });

        for message in &check.messages {
            warn!("{}", message);
        }

        let outdated = match &check.version {
            Some(remote) if remote != &self.local_version => {
                warn!(
                    "ServerDashboard version {} is available. Please download it or some features may work incorrectly",
                    remote
                );
                true
            }
            _ => false,
        };

        info!("✅ ServerDashboard token accepted");
        Ok(ValidationOutcome {
            remote_version: check.version,
            messages: check.messages,
            outdated,
        })
    }

    /// Fetches the triggers enabled for this server. Any failure yields an
    /// empty registry; nothing is retried.
    pub async fn fetch_enabled_webhooks(&self) -> WebhookRegistry {
        let response = match self.http.execute(&self.endpoints.list_webhooks()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ Could not fetch enabled webhooks: {}", e);
                return WebhookRegistry::empty();
            }
        };

        if !response.is_success() {
            warn!(
                "⚠️ Could not fetch enabled webhooks: HTTP {}",
                response.status
            );
            return WebhookRegistry::empty();
        }

        let registry = WebhookRegistry::parse(&response.body);
        info!("🔔 Enabled webhooks: {:?}", registry.names());
        registry
    }
}
