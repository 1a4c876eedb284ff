//! # shop-pricing
//!
//! Tax, shipping and price breakdowns for the bookshop checkout.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │ cart lines │──▶│ subtotal (cents) │──▶│ + shipping fee  │
//! └────────────┘   └──────────────────┘   └────────┬────────┘
//!                                                  ▼
//!                  ┌──────────────────┐   ┌─────────────────┐
//!                  │ PricingBreakdown │◀──│ TaxCalculator   │
//!                  └──────────────────┘   └─────────────────┘
//! ```
//!
//! Tax and shipping are strategies picked once at startup:
//!
//! - [`tax::QuadernoTax`] when a Quaderno API key is configured, otherwise
//!   [`tax::FlatRateTax`] (10%)
//! - [`shipping::RandomShippingEstimator`] ($5.00 to $15.00) unless a flat fee
//!   is configured

pub mod engine;
pub mod error;
pub mod shipping;
pub mod tax;

pub use engine::PricingEngine;
pub use error::{PricingError, Result};
pub use shipping::{FlatShippingEstimator, RandomShippingEstimator, ShippingConfig, ShippingEstimator};
pub use tax::{FLAT_TAX_RATE, FlatRateTax, QuadernoConfig, QuadernoTax, TaxCalculator, TaxQuote};
