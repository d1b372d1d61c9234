//! Outbound request values and the dashboard API endpoints.
//!
//! A [`DispatchRequest`] owns everything needed to perform one call, so it can
//! be moved onto a background worker without borrowing plugin state.

use crate::sampler::TelemetrySample;
use std::fmt;
use urlencoding::encode;

pub const CHECK_PATH: &str = "/v1/server/check";
pub const WEBHOOKS_PATH: &str = "/v1/server/webhooks";
pub const MAIN_STATISTICS_PATH: &str = "/v1/server/main-statistics";
pub const PLAYER_STATISTICS_PATH: &str = "/v1/server/player-statistics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Ordered `application/x-www-form-urlencoded` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Encodes the fields in insertion order.
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub url: String,
    pub method: Method,
    pub form: Option<FormBody>,
}

impl DispatchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            form: None,
        }
    }

    pub fn post(url: impl Into<String>, form: FormBody) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            form: Some(form),
        }
    }

    /// The URL-encoded request body, if this is a form POST.
    pub fn body(&self) -> Option<String> {
        self.form.as_ref().map(FormBody::encode)
    }
}

/// Builds requests for each dashboard API call.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    token: String,
}

impl Endpoints {
    /// `base_url` must not end with a slash.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn check_token(&self) -> DispatchRequest {
        DispatchRequest::get(format!(
            "{}{}?token={}",
            self.base_url,
            CHECK_PATH,
            encode(&self.token)
        ))
    }

    pub fn list_webhooks(&self) -> DispatchRequest {
        DispatchRequest::get(format!(
            "{}{}?token={}&list=true",
            self.base_url,
            WEBHOOKS_PATH,
            encode(&self.token)
        ))
    }

    /// `args` is only sent when `arg` is non-empty.
    pub fn send_webhook(&self, trigger: &str, arg: &str) -> DispatchRequest {
        let mut form = FormBody::new()
            .field("token", &self.token)
            .field("trigger", trigger);
        if !arg.is_empty() {
            form = form.field("args", arg);
        }

        DispatchRequest::post(
            format!("{}{}?send=true", self.base_url, WEBHOOKS_PATH),
            form,
        )
    }

    pub fn main_statistics(&self, sample: &TelemetrySample) -> DispatchRequest {
        let form = FormBody::new()
            .field("token", &self.token)
            .field("playerCount", sample.player_count)
            .field("tps", sample.tps_average)
            .field("loadedChunks", sample.loaded_chunk_count);

        DispatchRequest::post(format!("{}{}", self.base_url, MAIN_STATISTICS_PATH), form)
    }

    /// `username` must already be anonymized.
    pub fn player_statistics(&self, username: &str, device_os: &str) -> DispatchRequest {
        let form = FormBody::new()
            .field("token", &self.token)
            .field("username", username)
            .field("deviceOS", device_os);

        DispatchRequest::post(format!("{}{}", self.base_url, PLAYER_STATISTICS_PATH), form)
    }
}
