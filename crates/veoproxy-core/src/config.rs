//! Client configuration

use std::time::Duration;
use tracing::warn;

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default provider API base URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Configuration for [`crate::VeoClient`]
#[derive(Debug, Clone)]
pub struct VeoConfig {
    /// Provider API base URL (no trailing slash)
    pub api_base: String,

    /// Provider credential; `None` makes every operation fail fast with a
    /// configuration error before any network call
    pub api_key: Option<String>,

    /// Delay between consecutive status fetches
    pub poll_interval: Duration,
}

impl Default for VeoConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            poll_interval: crate::poll::POLL_INTERVAL,
        }
    }
}

impl VeoConfig {
    /// Build a configuration from the environment, reading the credential
    /// from `GEMINI_API_KEY`. A missing credential is warned about here and
    /// turned into a configuration error on first use.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            warn!(
                "provider credential not found in environment variable '{}'",
                API_KEY_ENV
            );
        }

        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Whether a credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Override the API base URL (trailing slashes are stripped)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the credential
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the status poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
