//! Application State

use std::sync::Arc;

use shop_payments::{AirwallexClient, CheckoutService, WebhookHandler, WebhookVerifier};
use shop_pricing::{PricingEngine, ShippingEstimator, shipping, tax};

use crate::config::{AppConfig, ConfigError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tax-aware price breakdowns
    pub pricing: PricingEngine,

    /// Shipping fee strategy
    pub shipping: Arc<dyn ShippingEstimator>,

    /// Cart → payment intent
    pub checkout: CheckoutService,

    pub webhook_verifier: Arc<WebhookVerifier>,
    pub webhook_handler: WebhookHandler,

    /// Sent as the intent's `return_url`
    pub return_url: Arc<str>,

    /// Authentication mode of the payment API, for health output
    pub payment_auth: Arc<str>,
}

impl AppState {
    /// Wire every component from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let pricing = PricingEngine::new(tax::from_config(&config.quaderno)?);
        let shipping = shipping::from_config(&config.shipping);

        let gateway = AirwallexClient::new(&config.airwallex)?;
        let payment_auth: Arc<str> = gateway.auth_mode().into();

        let checkout = CheckoutService::new(pricing.clone(), shipping.clone(), Arc::new(gateway));

        Ok(Self {
            pricing,
            shipping,
            checkout,
            webhook_verifier: Arc::new(WebhookVerifier::from_config(&config.webhook)),
            webhook_handler: WebhookHandler::default(),
            return_url: config.return_url().into(),
            payment_auth,
        })
    }
}
