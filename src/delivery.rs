//! Outbound delivery: one HTTP POST attempt to one subscriber.
//!
//! The [`DeliveryAgent`] trait abstracts the outbound call so the dispatcher
//! can be tested without real HTTP. Every failure mode is an ordinary
//! [`DeliveryOutcome`] value — a bad subscriber must never unwind the fan-out
//! loop or the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use url::Url;

use crate::events::Envelope;

/// Default per-attempt timeout, spanning connect + response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx response; the body is not interpreted
    Delivered { status: u16 },
    /// The attempt exceeded the configured timeout
    Timeout,
    /// Transport-level failure (DNS, refusal, TLS)
    ConnectionError { message: String },
    /// Non-2xx HTTP response
    HttpError { status: u16 },
}

impl DeliveryOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Timeout => "timeout",
            Self::ConnectionError { .. } => "connection_error",
            Self::HttpError { .. } => "http_error",
        }
    }
}

/// Record of one outbound call. Transient: converted into a log record by the
/// outcome reporter and then discarded, never retried or re-queued.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub url: Url,
    pub outcome: DeliveryOutcome,
    pub latency: Duration,
}

/// Trait for performing one delivery attempt.
///
/// The signature is infallible: failures are represented in the returned
/// attempt's outcome, not propagated.
#[async_trait]
pub trait DeliveryAgent: Send + Sync + 'static {
    async fn deliver(&self, url: &Url, envelope: &Envelope) -> DeliveryAttempt;
}

/// Production delivery agent using reqwest.
#[derive(Clone)]
pub struct HttpDeliveryAgent {
    client: reqwest::Client,
}

impl HttpDeliveryAgent {
    /// Create an agent whose attempts self-cancel after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create webhook HTTP client");
        Self { client }
    }
}

impl Default for HttpDeliveryAgent {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl DeliveryAgent for HttpDeliveryAgent {
    async fn deliver(&self, url: &Url, envelope: &Envelope) -> DeliveryAttempt {
        tracing::debug!(url = %url, event = %envelope.event_type, "Sending webhook HTTP request");
        let start = Instant::now();

        let outcome = match self.client.post(url.clone()).json(envelope).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    DeliveryOutcome::Delivered { status }
                } else {
                    DeliveryOutcome::HttpError { status }
                }
            }
            Err(e) if e.is_timeout() => DeliveryOutcome::Timeout,
            Err(e) => DeliveryOutcome::ConnectionError {
                message: e.to_string(),
            },
        };

        DeliveryAttempt {
            url: url.clone(),
            outcome,
            latency: start.elapsed(),
        }
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock delivery agent for dispatcher tests.
///
/// Records every call and returns a scripted outcome per URL (default:
/// `Delivered { status: 200 }`), without any network I/O.
#[derive(Clone, Default)]
pub struct MockDeliveryAgent {
    outcomes: Arc<Mutex<HashMap<String, DeliveryOutcome>>>,
    calls: Arc<Mutex<Vec<MockDelivery>>>,
}

/// Record of a call made to the mock delivery agent.
#[derive(Debug, Clone)]
pub struct MockDelivery {
    pub url: String,
    pub envelope: Envelope,
}

impl MockDeliveryAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome returned for a specific URL.
    pub fn set_outcome(&self, url: &str, outcome: DeliveryOutcome) {
        self.outcomes.lock().insert(url.to_string(), outcome);
    }

    /// All deliveries attempted through this agent.
    pub fn deliveries(&self) -> Vec<MockDelivery> {
        self.calls.lock().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl DeliveryAgent for MockDeliveryAgent {
    async fn deliver(&self, url: &Url, envelope: &Envelope) -> DeliveryAttempt {
        self.calls.lock().push(MockDelivery {
            url: url.to_string(),
            envelope: envelope.clone(),
        });

        let outcome = self
            .outcomes
            .lock()
            .get(url.as_str())
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered { status: 200 });

        DeliveryAttempt {
            url: url.clone(),
            outcome,
            latency: Duration::ZERO,
        }
    }
}
