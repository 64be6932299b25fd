//! Webhook subsystem configuration.

use std::time::Duration;

/// Configuration for the webhook dispatcher.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Subscriber URLs loaded into the registry at startup
    pub startup_urls: Vec<String>,
    /// HTTP timeout for a single delivery attempt in seconds (default: 5)
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            startup_urls: Vec::new(),
            timeout_secs: 5,
        }
    }
}

impl WebhookConfig {
    /// Load configuration from the environment.
    ///
    /// `WEBHOOK_URLS` holds a comma-separated list of subscriber URLs;
    /// entries are trimmed and empty entries skipped.
    pub fn from_env() -> Self {
        let startup_urls = std::env::var("WEBHOOK_URLS")
            .map(|raw| parse_url_list(&raw))
            .unwrap_or_default();

        Self {
            startup_urls,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
