//! Outcome reporting: per-attempt observability, nothing else.
//!
//! Each delivery attempt becomes exactly one structured log line and one
//! counter increment. Nothing here feeds back into dispatch control flow, and
//! nothing here can fail: the tracing and metrics facades swallow sink
//! unavailability.

use metrics::counter;

use crate::delivery::{DeliveryAttempt, DeliveryOutcome};
use crate::events::EventType;

/// Record the outcome of one delivery attempt.
pub fn record(event_type: EventType, attempt: &DeliveryAttempt) {
    counter!("webhook_deliveries_total", "outcome" => attempt.outcome.label()).increment(1);

    let latency_ms = attempt.latency.as_millis() as u64;
    match &attempt.outcome {
        DeliveryOutcome::Delivered { status } => {
            tracing::info!(
                event = %event_type,
                url = %attempt.url,
                status = status,
                latency_ms = latency_ms,
                "Webhook delivered successfully"
            );
        }
        DeliveryOutcome::Timeout => {
            tracing::warn!(
                event = %event_type,
                url = %attempt.url,
                latency_ms = latency_ms,
                "Webhook delivery timed out"
            );
        }
        DeliveryOutcome::ConnectionError { message } => {
            tracing::warn!(
                event = %event_type,
                url = %attempt.url,
                error = %message,
                latency_ms = latency_ms,
                "Webhook delivery failed (network error)"
            );
        }
        DeliveryOutcome::HttpError { status } => {
            tracing::warn!(
                event = %event_type,
                url = %attempt.url,
                status = status,
                latency_ms = latency_ms,
                "Webhook delivery failed"
            );
        }
    }
}
