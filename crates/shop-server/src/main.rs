//! Bookshop Checkout Server
//!
//! Axum-based server behind the storefront: catalog, pricing, shipping
//! quotes, Airwallex payment intents and the Airwallex webhook.

mod config;
mod handlers;
mod routes;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    if config.quaderno.is_enabled() {
        tracing::info!("✓ Quaderno configured");
    } else {
        tracing::warn!("⚠ Quaderno not configured - using flat 10% tax");
        tracing::warn!("  Set QUADERNO_API_KEY in .env for jurisdiction-aware tax");
    }

    if config.airwallex.credentials().is_some() {
        tracing::info!("✓ Airwallex credentials configured ({})", config.airwallex.env);
    } else {
        tracing::warn!("⚠ Airwallex credentials not set - calling {} without authentication", config.airwallex.base_url);
    }

    if state.webhook_verifier.is_configured() {
        tracing::info!("✓ Webhook secret configured");
    } else {
        tracing::warn!("⚠ AIRWALLEX_WEBHOOK_SECRET not set - every webhook will be rejected");
    }

    let app = build_router(state, cors_layer(&config.frontend_base_url));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("📚 bookshop checkout running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  GET  /books                   - Book catalog");
    tracing::info!("  POST /payment-intent/pricing  - Price a cart");
    tracing::info!("  POST /payment-intent/shipping - Quote shipping");
    tracing::info!("  POST /payment-intent          - Create payment intent");
    tracing::info!("  POST /webhooks/airwallex      - Airwallex webhook");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
