//! Router

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    airwallex_webhook, calculate_pricing, calculate_shipping, create_payment_intent, health_check, list_books,
};
use crate::state::AppState;

/// CORS for the storefront origin
pub fn cors_layer(frontend_base_url: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match frontend_base_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %frontend_base_url, "FRONTEND_BASE_URL is not a valid origin, allowing any");
            cors.allow_origin(Any)
        }
    }
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Health & catalog
        .route("/health", get(health_check))
        .route("/books", get(list_books))

        // Checkout
        .route("/payment-intent", post(create_payment_intent))
        .route("/payment-intent/pricing", post(calculate_pricing))
        .route("/payment-intent/shipping", post(calculate_shipping))

        // Webhooks
        .route("/webhooks/airwallex", post(airwallex_webhook))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
