//! Client configuration

use std::time::Duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:9000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Environment variables read by [`ClientConfig::from_env`]
pub mod env {
    pub const URL: &str = "METRONOME_URL";
    pub const DEBUG: &str = "METRONOME_DEBUG";
    pub const REQUEST_TIMEOUT: &str = "METRONOME_REQUEST_TIMEOUT";
}

/// Metronome client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service (e.g., `http://127.0.0.1:9000`)
    pub base_url: String,

    /// Log request and response bodies
    pub debug: bool,

    /// Upper bound for a whole request, body included
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            debug: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load from `METRONOME_*` environment variables
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup(env::URL).unwrap_or(defaults.base_url);

        let debug = lookup(env::DEBUG)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.debug);

        let request_timeout = lookup(env::REQUEST_TIMEOUT)
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            base_url,
            debug,
            request_timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_timeout_secs(self, secs: u64) -> Self {
        self.with_timeout(Duration::from_secs(secs))
    }
}
