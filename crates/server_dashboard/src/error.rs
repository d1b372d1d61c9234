//! Error types for the Server Dashboard plugin.
//!
//! Startup errors ([`ConfigError`], [`ValidationError`]) stop plugin
//! initialization. Runtime errors ([`TransportError`], [`ProtocolError`]) are
//! logged and dropped by the caller, they never reach the host.

use thiserror::Error;

/// Invalid or incomplete plugin configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid API URL {0:?}: must start with http:// or https://")]
    InvalidApiUrl(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failure of a single outbound HTTP request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// The token check did not succeed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("dashboard API unreachable: {0}")]
    Unreachable(#[from] TransportError),

    #[error("token rejected by dashboard API (HTTP {status})")]
    Rejected { status: u16 },
}

/// A response body from the check or list endpoint could not be understood.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed check response: {0}")]
    MalformedCheckResponse(#[from] serde_json::Error),
}

/// Top-level error returned by plugin startup.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("token validation failed: {0}")]
    Validation(#[from] ValidationError),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ConfigError::MissingToken.to_string(), "missing token");
        assert_eq!(
            ValidationError::Rejected { status: 403 }.to_string(),
            "token rejected by dashboard API (HTTP 403)"
        );

        let err: DashboardError = ConfigError::MissingToken.into();
        assert_eq!(err.to_string(), "configuration error: missing token");
    }

    #[test]
    fn test_transport_into_validation() {
        let err: ValidationError = TransportError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, ValidationError::Unreachable(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
