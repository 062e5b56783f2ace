//! Client configuration.
//!
//! Defaults target the public Podcast Index API. `from_env` overlays
//! `PODCASTINDEX_*` variables on top, and the struct deserializes with serde
//! so applications can embed it in their own config files.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.podcastindex.org/api/1.0";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const ENV_BASE_URL: &str = "PODCASTINDEX_BASE_URL";
const ENV_USER_AGENT: &str = "PODCASTINDEX_USER_AGENT";
const ENV_TIMEOUT_SECS: &str = "PODCASTINDEX_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `user-agent`; the service rejects requests without one.
    pub user_agent: Option<String>,
    /// Whole-request budget applied by the transport. Never zero.
    #[serde(deserialize_with = "nonzero_ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: Some(default_user_agent()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with any `PODCASTINDEX_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            config.user_agent = Some(user_agent).filter(|ua| !ua.is_empty());
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs))?;
        }
        Ok(config)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the request timeout with millisecond precision. A budget that
    /// rounds down to zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return Err(ApiError::Config(format!(
                "timeout must be at least 1ms, got {timeout:?}"
            )));
        }
        self.timeout_ms = millis;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn nonzero_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match u64::deserialize(deserializer)? {
        0 => Err(serde::de::Error::custom("timeout_ms must be greater than zero")),
        millis => Ok(millis),
    }
}

fn default_user_agent() -> String {
    format!("podcastindex-rs/{}", env!("CARGO_PKG_VERSION"))
}
