//! Connection settings for the remote catalog API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BASE_URL_ENV: &str = "MUSIC_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "MUSIC_API_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid client configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Base address, timeout and default headers used by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Every request path is resolved against this address, e.g.
    /// `https://example.org/api`.
    pub base_url: String,

    /// Overall deadline for one request, in milliseconds. `None` waits
    /// indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Headers sent with every request.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms: None,
            headers: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parses a JSON document such as
    /// `{"base_url": "http://localhost:3000/api", "timeout_ms": 30000}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(json)?;
        Ok(ClientConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        })
    }

    /// Reads `MUSIC_API_BASE_URL` and the optional `MUSIC_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_ENV).ok_or(ConfigError::MissingVar(BASE_URL_ENV))?;
        let mut config = Self::new(&base_url);
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }
        Ok(config)
    }
}
