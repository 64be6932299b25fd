use std::sync::Arc;

use bookshelf_webhooks::{
    api, HttpDeliveryAgent, SubscriberRegistry, WebhookConfig, WebhookNotifier,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bookshelf_webhooks=debug,info".into()),
        )
        .init();

    let config = WebhookConfig::from_env();

    // Seed the registry before the server accepts traffic so configured
    // subscribers see every domain event.
    let registry = Arc::new(SubscriberRegistry::new());
    registry.seed(&config.startup_urls);
    tracing::info!(subscribers = registry.len(), "Seeded webhook registry");

    let notifier = Arc::new(WebhookNotifier::new(
        registry,
        HttpDeliveryAgent::new(config.timeout()),
    ));

    let app = api::router(notifier);

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Webhook management server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
