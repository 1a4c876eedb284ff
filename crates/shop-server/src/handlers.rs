//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shop_core::{Book, Cart, CartItem, Destination, ModelError, PricingBreakdown, ShippingAddress, catalog};
use shop_payments::{CheckoutOutcome, CheckoutRequest, PaymentError};
use shop_pricing::PricingError;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tax_service: String,
    pub payment_auth: String,
    pub webhook_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub shipping_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingResponse {
    pub shipping_amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub pricing: Option<PricingBreakdown>,
    #[serde(default)]
    pub shipping_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// Error returned by handlers, rendered as `{error, code, details?}`
#[derive(Debug)]
pub enum ApiError {
    Payment(PaymentError),

    /// Request body was not the JSON we expect
    Body(JsonRejection),
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        Self::Payment(e)
    }
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        Self::Payment(PaymentError::from(e))
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        Self::Payment(PaymentError::Validation(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        let err = match self {
            Self::Payment(err) => err,
            Self::Body(JsonRejection::MissingJsonContentType(_)) => {
                return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "INVALID_REQUEST_BODY");
            }
            Self::Body(_) => return (StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY"),
        };

        match err {
            PaymentError::EmptyCart => (StatusCode::BAD_REQUEST, "EMPTY_CART"),
            PaymentError::MissingAddress => (StatusCode::BAD_REQUEST, "MISSING_ADDRESS"),
            PaymentError::Validation(_) | PaymentError::Pricing(PricingError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            PaymentError::WebhookSignature(_) => (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE"),
            PaymentError::WebhookParse(_) => (StatusCode::BAD_REQUEST, "INVALID_WEBHOOK_PAYLOAD"),
            PaymentError::Api { .. } => (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR"),
            PaymentError::Network(e) if e.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, "PAYMENT_PROVIDER_TIMEOUT"),
            PaymentError::Network(_) => (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_UNREACHABLE"),
            PaymentError::Pricing(PricingError::Config(_)) | PaymentError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            PaymentError::Pricing(e) if e.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, "TAX_SERVICE_TIMEOUT"),
            PaymentError::Pricing(_) => (StatusCode::BAD_GATEWAY, "TAX_SERVICE_ERROR"),
            PaymentError::ContractViolation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONTRACT_VIOLATION"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = match self {
            Self::Payment(err) => {
                if status.is_server_error() {
                    tracing::error!(code, error = %err, retryable = err.is_retryable(), "Request failed");
                } else {
                    tracing::warn!(code, error = %err, "Request rejected");
                }

                ErrorResponse {
                    error: err.user_message(),
                    code: code.into(),
                    details: err.details(),
                }
            }
            Self::Body(rejection) => {
                tracing::warn!(code, error = %rejection.body_text(), "Request body rejected");

                ErrorResponse {
                    error: rejection.body_text(),
                    code: code.into(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections render as [`ErrorResponse`]
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tax_service: state.pricing.tax_calculator().name().to_string(),
        payment_auth: state.payment_auth.to_string(),
        webhook_configured: state.webhook_verifier.is_configured(),
    })
}

/// Book catalog
pub async fn list_books() -> Json<Vec<Book>> {
    Json(catalog::books().to_vec())
}

/// Price a cart, with tax for the destination when an address is known
pub async fn calculate_pricing(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PricingRequest>,
) -> Result<Json<PricingBreakdown>, ApiError> {
    let cart = Cart::from_items(payload.cart_items);
    cart.validate()?;

    let destination = match payload.shipping_address {
        Some(address) => {
            address.check()?;
            Some(address.destination())
        }
        None => None,
    };

    let pricing = state
        .pricing
        .compute_pricing(cart.items(), destination.as_ref(), payload.shipping_amount)
        .await?;

    Ok(Json(pricing))
}

/// Quote shipping to a destination
pub async fn calculate_shipping(
    State(state): State<AppState>,
    AppJson(destination): AppJson<Destination>,
) -> Result<Json<ShippingResponse>, ApiError> {
    destination.check()?;

    let shipping_amount = state.shipping.estimate_shipping(&destination);
    tracing::debug!(country = %destination.country, fee = %shipping_amount, "Quoted shipping");

    Ok(Json(ShippingResponse { shipping_amount }))
}

/// Create an Airwallex payment intent for the cart
pub async fn create_payment_intent(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePaymentIntentRequest>,
) -> Result<Json<CheckoutOutcome>, ApiError> {
    let request = CheckoutRequest {
        cart_items: payload.cart_items,
        return_url: state.return_url.to_string(),
        shipping_address: payload.shipping_address,
        pricing: payload.pricing,
        shipping_amount: payload.shipping_amount,
    };

    let outcome = state.checkout.checkout(request).await?;
    Ok(Json(outcome))
}

/// Airwallex webhook
///
/// Takes the body as raw bytes: the signature covers the exact bytes sent,
/// so nothing may parse or re-encode the body before verification.
pub async fn airwallex_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    state
        .webhook_verifier
        .verify(&body, header("x-timestamp"), header("x-signature"))?;

    state.webhook_handler.handle(&body).await?;

    Ok(Json(WebhookAck { received: true }))
}
