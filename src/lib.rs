//! Webhook notification dispatcher for the bookshelf library-catalogue
//! service.
//!
//! When a domain event occurs (a book is borrowed or returned, a user
//! registers, or an operator requests a test), this crate broadcasts a
//! structured notification to every externally registered HTTP endpoint —
//! without blocking or failing the triggering request, and tolerating slow
//! or unreachable subscribers. Delivery is strictly best-effort: no retry,
//! no persistence, no acknowledgement tracking.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use bookshelf_webhooks::{EventType, HttpDeliveryAgent, SubscriberRegistry, WebhookNotifier};
//!
//! let registry = Arc::new(SubscriberRegistry::new());
//! registry.add("https://example.test/hook")?;
//!
//! let notifier = WebhookNotifier::new(registry, HttpDeliveryAgent::default());
//!
//! // Fire-and-forget from the business handler; returns immediately.
//! notifier.broadcast(EventType::UserRegistered, serde_json::json!({
//!     "user_id": 45,
//!     "user_name": "Ada Lovelace",
//!     "user_email": "ada@example.com",
//! }));
//! ```

pub mod api;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use config::WebhookConfig;
pub use delivery::{DeliveryAgent, DeliveryAttempt, DeliveryOutcome, HttpDeliveryAgent, MockDeliveryAgent};
pub use dispatcher::WebhookNotifier;
pub use error::{Error, Result};
pub use events::{Envelope, EventData, EventType};
pub use registry::{Subscriber, SubscriberRegistry};
