//! Configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKOFF_MILLIS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use crate::errors::Result;
use crate::utils::api_root_for_key;

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API connection settings
    pub api: ApiConfig,
}

/// Connection settings for the REST API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key including its datacenter suffix (e.g. `abc123-us13`)
    pub api_key: String,

    /// Explicit versioned API root; derived from the key when absent
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per request (initial try + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Base delay between retries in milliseconds, doubled per retry
    #[serde(default = "default_backoff_millis")]
    pub backoff_millis: u64,

    /// Optional User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ApiConfig {
    /// Create a configuration with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_millis: DEFAULT_BACKOFF_MILLIS,
            user_agent: None,
        }
    }

    /// Versioned API root requests are resolved against
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` when no base URL is set and the key
    /// carries no datacenter suffix.
    pub fn api_root(&self) -> Result<String> {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => api_root_for_key(&self.api_key),
        }
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base retry backoff
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_millis)
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_millis", &self.backoff_millis)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_millis() -> u64 {
    DEFAULT_BACKOFF_MILLIS
}
