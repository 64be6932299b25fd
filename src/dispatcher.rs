//! Broadcast dispatch: build once, snapshot, fan out, report.
//!
//! ```text
//! broadcast(event_type, source)        // returns immediately
//!   ├─ Envelope::build()               // malformed data → log + abort
//!   ├─ registry.snapshot()             // point-in-time subscriber set
//!   └─ for each url: tokio::spawn ──┐
//!                                   ▼
//!                         agent.deliver(url, envelope)
//!                                   │
//!                         report::record(event, attempt)
//! ```
//!
//! The caller never blocks on delivery: spawned attempts run concurrently
//! with each other and with the triggering request, and nobody awaits them.
//! A URL removed while an attempt is in flight still receives that attempt;
//! the next broadcast excludes it.

use std::sync::Arc;

use serde_json::Value;

use crate::delivery::{DeliveryAgent, HttpDeliveryAgent};
use crate::events::{Envelope, EventType};
use crate::registry::SubscriberRegistry;
use crate::report;

/// Fans domain events out to every registered subscriber.
///
/// Generic over the delivery seam so dispatch semantics can be tested
/// without real HTTP.
pub struct WebhookNotifier<D: DeliveryAgent = HttpDeliveryAgent> {
    registry: Arc<SubscriberRegistry>,
    agent: Arc<D>,
}

impl<D: DeliveryAgent> WebhookNotifier<D> {
    pub fn new(registry: Arc<SubscriberRegistry>, agent: D) -> Self {
        Self {
            registry,
            agent: Arc::new(agent),
        }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Broadcast one event to the current subscriber snapshot.
    ///
    /// Fire-and-forget: returns before any delivery starts, holds no
    /// aggregate result, and surfaces no error to the caller. Must be called
    /// from within a tokio runtime.
    pub fn broadcast(&self, event_type: EventType, source: Value) {
        let envelope = match Envelope::build(event_type, source) {
            Ok(envelope) => envelope,
            Err(e) => {
                // The triggering domain operation must still succeed, so the
                // broadcast is dropped here rather than propagated.
                metrics::counter!("webhook_broadcasts_aborted_total").increment(1);
                tracing::warn!(event = %event_type, error = %e, "Dropping webhook broadcast");
                return;
            }
        };

        let targets = self.registry.snapshot();
        if targets.is_empty() {
            tracing::debug!(event = %event_type, "No webhook subscribers registered");
            return;
        }

        tracing::debug!(
            event = %event_type,
            subscribers = targets.len(),
            "Broadcasting webhook notification"
        );

        let envelope = Arc::new(envelope);
        for url in targets {
            let agent = Arc::clone(&self.agent);
            let envelope = Arc::clone(&envelope);
            tokio::spawn(async move {
                let attempt = agent.deliver(&url, &envelope).await;
                report::record(envelope.event_type, &attempt);
            });
        }
    }
}
