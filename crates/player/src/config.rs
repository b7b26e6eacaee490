//! Player configuration.

use std::time::Duration;

use url::Url;

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:3000";

/// Timing of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last edit before a save is sent.
    pub debounce: Duration,
    /// A save that takes longer than this fails with [`crate::SyncError::Timeout`].
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            debounce: millis(&lookup, "SHEETWRIGHT_DEBOUNCE_MS").unwrap_or(defaults.debounce),
            request_timeout: millis(&lookup, "SHEETWRIGHT_REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout),
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid duration, using default");
            None
        }
    }
}

/// Where the engine lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `SHEETWRIGHT_ENGINE_URL` must be an absolute http(s) URL; anything else
    /// falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("SHEETWRIGHT_ENGINE_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .filter(|raw| match Url::parse(raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => true,
                _ => {
                    tracing::warn!(value = %raw, "Invalid SHEETWRIGHT_ENGINE_URL, using default");
                    false
                }
            });

        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string()),
        }
    }
}
