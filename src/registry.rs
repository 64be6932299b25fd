//! In-memory subscriber endpoint registry.
//!
//! The registry is the only shared mutable state in the subsystem. It is
//! guarded by a single `parking_lot::Mutex` that is never held across I/O:
//! broadcasts operate on a point-in-time [`snapshot`](SubscriberRegistry::snapshot)
//! and are unaffected by concurrent add/remove operations.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use url::Url;

use crate::error::{Error, Result};

/// One registered webhook endpoint.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub url: Url,
    pub registered_at: DateTime<Utc>,
}

/// Registered subscriber endpoints, in registration order.
///
/// URLs are the unique key; state lives only in memory and is re-seeded from
/// configuration on startup.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: Mutex<Vec<Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a webhook URL.
    ///
    /// Returns `Ok(true)` if the URL was added, `Ok(false)` if it was already
    /// registered (idempotent, no duplicate entry). Fails with
    /// [`Error::InvalidUrl`] on malformed input, leaving the registry
    /// unchanged.
    pub fn add(&self, url: &str) -> Result<bool> {
        let url = validate_url(url)?;

        let mut subscribers = self.inner.lock();
        if subscribers.iter().any(|s| s.url == url) {
            return Ok(false);
        }

        tracing::info!(url = %url, "Added webhook URL");
        subscribers.push(Subscriber {
            url,
            registered_at: Utc::now(),
        });
        Ok(true)
    }

    /// Remove a webhook URL. Returns whether an entry existed; removing a
    /// non-member is not an error.
    ///
    /// Matches by parsed URL equality, so any spelling that normalizes to a
    /// registered entry removes it — the same equality `add` dedups by.
    pub fn remove(&self, url: &str) -> bool {
        let parsed = Url::parse(url).ok();

        let mut subscribers = self.inner.lock();
        let before = subscribers.len();
        subscribers.retain(|s| match &parsed {
            Some(parsed) => s.url != *parsed,
            None => s.url.as_str() != url,
        });
        let removed = subscribers.len() < before;
        drop(subscribers);

        if removed {
            tracing::info!(url = %url, "Removed webhook URL");
        }
        removed
    }

    /// Registered URLs in registration order. The order is stable for
    /// display purposes only.
    pub fn list(&self) -> Vec<String> {
        self.inner.lock().iter().map(|s| s.url.to_string()).collect()
    }

    /// Point-in-time copy of the registered URLs for a broadcast to iterate
    /// over. Mutations after the snapshot do not affect it.
    pub fn snapshot(&self) -> Vec<Url> {
        self.inner.lock().iter().map(|s| s.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Seed the registry from startup configuration.
    ///
    /// Invalid entries are skipped with a warning rather than failing
    /// startup; a bad configured URL must not take the service down.
    pub fn seed<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            if let Err(e) = self.add(url.as_ref()) {
                tracing::warn!(url = %url.as_ref(), error = %e, "Skipping configured webhook URL");
            }
        }
    }
}

/// Validate webhook URL syntax: absolute, http/https, non-empty host.
fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::InvalidUrl {
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl {
            reason: "missing host".to_string(),
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list_preserves_order() {
        let registry = SubscriberRegistry::new();
        assert!(registry.add("https://a.example.test/hook").unwrap());
        assert!(registry.add("https://b.example.test/hook").unwrap());

        assert_eq!(
            registry.list(),
            vec![
                "https://a.example.test/hook".to_string(),
                "https://b.example.test/hook".to_string(),
            ]
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = SubscriberRegistry::new();
        assert!(registry.add("https://example.test/hook").unwrap());
        assert!(!registry.add("https://example.test/hook").unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let registry = SubscriberRegistry::new();

        for bad in ["not-a-url", "ftp://example.test/hook", "http://", ""] {
            let err = registry.add(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidUrl { .. }), "accepted {bad:?}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let registry = SubscriberRegistry::new();
        assert!(!registry.remove("https://example.test/hook"));

        registry.add("https://example.test/hook").unwrap();
        assert!(registry.remove("https://example.test/hook"));
        assert!(!registry.remove("https://example.test/hook"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_accepts_the_spelling_used_to_add() {
        let registry = SubscriberRegistry::new();

        // Host-only URL: stored normalized with a trailing slash
        registry.add("http://example.test").unwrap();
        assert!(registry.remove("http://example.test"));
        assert!(registry.is_empty());

        // Explicit default port: normalized away on add
        registry.add("https://example.test:443/hook").unwrap();
        assert!(registry.remove("https://example.test:443/hook"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_accepts_normalized_spelling() {
        let registry = SubscriberRegistry::new();
        registry.add("http://example.test").unwrap();

        assert_eq!(registry.list(), vec!["http://example.test/".to_string()]);
        assert!(registry.remove("http://example.test/"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutations() {
        let registry = SubscriberRegistry::new();
        registry.add("https://a.example.test/hook").unwrap();

        let snapshot = registry.snapshot();
        registry.add("https://b.example.test/hook").unwrap();
        registry.remove("https://a.example.test/hook");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].as_str(), "https://a.example.test/hook");
    }

    #[test]
    fn test_seed_skips_invalid_entries() {
        let registry = SubscriberRegistry::new();
        registry.seed(["https://a.example.test/hook", "not-a-url", "https://b.example.test/hook"]);

        assert_eq!(registry.len(), 2);
    }
}
