//! HTTP handlers for webhook management endpoints.
//!
//! Authentication/authorization for these routes is the web tier's concern;
//! the router here only manages the subscriber registry and exercises the
//! dispatch path via the test endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::delivery::DeliveryAgent;
use crate::dispatcher::WebhookNotifier;
use crate::error::{Error, Result};
use crate::events::EventType;

#[derive(Debug, Deserialize)]
pub struct WebhookCreate {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookListResponse {
    pub webhook_urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookUrlResponse {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookMessageResponse {
    pub message: String,
}

/// Build the management router. State is the shared notifier.
pub fn router<D: DeliveryAgent>(notifier: Arc<WebhookNotifier<D>>) -> Router {
    Router::new()
        .route("/webhooks", get(list_webhooks::<D>).post(add_webhook::<D>))
        .route("/webhooks/test", post(test_webhook::<D>))
        .route("/webhooks/{*url}", delete(remove_webhook::<D>))
        .with_state(notifier)
}

/// List registered webhook URLs in registration order.
#[instrument(skip_all)]
async fn list_webhooks<D: DeliveryAgent>(
    State(notifier): State<Arc<WebhookNotifier<D>>>,
) -> Json<WebhookListResponse> {
    Json(WebhookListResponse {
        webhook_urls: notifier.registry().list(),
    })
}

/// Register a webhook URL. Adding an already-registered URL is idempotent.
#[instrument(skip_all)]
async fn add_webhook<D: DeliveryAgent>(
    State(notifier): State<Arc<WebhookNotifier<D>>>,
    Json(request): Json<WebhookCreate>,
) -> Result<(StatusCode, Json<WebhookUrlResponse>)> {
    let url = request.url.ok_or_else(|| Error::InvalidUrl {
        reason: "missing url parameter".to_string(),
    })?;

    notifier.registry().add(&url)?;

    Ok((
        StatusCode::CREATED,
        Json(WebhookUrlResponse {
            message: "Webhook URL added".to_string(),
            url,
        }),
    ))
}

/// Remove a webhook URL. Succeeds whether or not the URL was registered.
#[instrument(skip_all)]
async fn remove_webhook<D: DeliveryAgent>(
    State(notifier): State<Arc<WebhookNotifier<D>>>,
    Path(url): Path<String>,
) -> Json<WebhookUrlResponse> {
    notifier.registry().remove(&url);

    Json(WebhookUrlResponse {
        message: "Webhook URL removed".to_string(),
        url,
    })
}

/// Broadcast a `system_health` test notification through the normal
/// dispatch path.
#[instrument(skip_all)]
async fn test_webhook<D: DeliveryAgent>(
    State(notifier): State<Arc<WebhookNotifier<D>>>,
) -> Json<WebhookMessageResponse> {
    notifier.broadcast(
        EventType::SystemHealth,
        json!({
            "message": "Test webhook notification",
            "timestamp": Utc::now(),
        }),
    );

    Json(WebhookMessageResponse {
        message: "Test webhook sent".to_string(),
    })
}
