//! # shop-payments
//!
//! Payment processing for the bookshop checkout: Airwallex payment intents,
//! the checkout flow that prices a cart and creates one, and webhook
//! verification.
//!
//! ## Checkout flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Frontend   │────▶│ CheckoutService │────▶│ Airwallex intent │
//! │ (cart+addr) │     │  (price cart)   │     │  (client secret) │
//! └─────────────┘     └─────────────────┘     └────────┬─────────┘
//!        ▲                                             │
//!        └──────── hosted payment page ◀───────────────┘
//! ```
//!
//! Airwallex later reports the outcome through a signed webhook, checked by
//! [`WebhookVerifier`] and dispatched by [`WebhookHandler`].
//!
//! ## Authentication
//!
//! With `AIRWALLEX_CLIENT_ID` and `AIRWALLEX_API_KEY` set, every intent
//! creation logs in first and sends the bearer token. Without them the API
//! is called unauthenticated, which suits sandbox stand-ins.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_payments::{AirwallexClient, AirwallexConfig, CheckoutRequest, CheckoutService};
//!
//! let gateway = Arc::new(AirwallexClient::new(&AirwallexConfig::from_env()?)?);
//! let checkout = CheckoutService::new(pricing, shipping, gateway);
//!
//! let outcome = checkout.checkout(CheckoutRequest {
//!     cart_items,
//!     return_url: "http://localhost:3000/".into(),
//!     shipping_address: Some(address),
//!     pricing: None,
//!     shipping_amount: None,
//! }).await?;
//!
//! // Hand outcome.intent.client_secret to the frontend
//! ```

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod intent;
pub mod webhook;

pub use auth::{ApiAuthenticator, LoginAuthenticator, NoAuthentication};
pub use checkout::{CheckoutOutcome, CheckoutRequest, CheckoutService};
pub use config::{AirwallexConfig, AirwallexEnv, WebhookConfig};
pub use error::{PaymentError, Result};
pub use intent::{AirwallexClient, OrderIds, PaymentGateway, PaymentIntentRequest, PaymentIntentResult};
pub use webhook::{
    LoggingEventSink, PaymentEventSink, WebhookEvent, WebhookHandler, WebhookPayload, WebhookVerifier,
    compute_signature, verify_signature,
};
