//! Checkout Orchestration
//!
//! Validates the cart and address, settles on a price breakdown and hands
//! the total to the payment gateway.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shop_core::{CURRENCY, Cart, CartItem, PricingBreakdown, ShippingAddress};
use shop_pricing::{PricingEngine, ShippingEstimator};

use crate::error::{PaymentError, Result};
use crate::intent::{PaymentGateway, PaymentIntentRequest, PaymentIntentResult};

/// Checkout request
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub cart_items: Vec<CartItem>,
    pub return_url: String,
    pub shipping_address: Option<ShippingAddress>,

    /// Breakdown the customer was shown; used as-is when present
    pub pricing: Option<PricingBreakdown>,

    /// Shipping fee already quoted to the customer
    pub shipping_amount: Option<Decimal>,
}

/// Created intent plus what it was priced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    #[serde(flatten)]
    pub intent: PaymentIntentResult,
    pub pricing: PricingBreakdown,
    #[serde(rename = "cartItems")]
    pub cart_items: Vec<CartItem>,
}

/// Checkout service
#[derive(Clone)]
pub struct CheckoutService {
    pricing: PricingEngine,
    shipping: Arc<dyn ShippingEstimator>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(pricing: PricingEngine, shipping: Arc<dyn ShippingEstimator>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            pricing,
            shipping,
            gateway,
        }
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    /// Run a checkout end to end
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let cart = Cart::from_items(request.cart_items);
        if cart.is_empty() {
            return Err(PaymentError::EmptyCart);
        }
        cart.validate()?;

        let address = request.shipping_address.ok_or(PaymentError::MissingAddress)?;
        address.check()?;

        let pricing = match request.pricing {
            Some(pricing) => {
                pricing.check()?;
                tracing::debug!(total = %pricing.total, "Using pricing supplied by the client");
                pricing
            }
            None => {
                let destination = address.destination();
                let shipping = request
                    .shipping_amount
                    .unwrap_or_else(|| self.shipping.estimate_shipping(&destination));
                self.pricing
                    .compute_pricing(cart.items(), Some(&destination), Some(shipping))
                    .await?
            }
        };

        tracing::info!(
            lines = cart.len(),
            copies = cart.item_count(),
            total = %pricing.total,
            gateway = self.gateway.name(),
            "Starting checkout"
        );

        let cart_items = cart.into_items();
        let intent_request = PaymentIntentRequest {
            amount: pricing.total,
            currency: CURRENCY.to_string(),
            cart_items: cart_items.clone(),
            return_url: request.return_url,
            shipping_address: Some(address),
            shipping_amount: Some(pricing.shipping),
            tax_amount: Some(pricing.tax),
        };

        let mut intent = self.gateway.create_payment_intent(&intent_request).await?;
        intent.amount = pricing.total;

        Ok(CheckoutOutcome {
            intent,
            pricing,
            cart_items,
        })
    }
}
