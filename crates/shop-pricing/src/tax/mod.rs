//! Tax Calculation
//!
//! Strategy trait for tax quotes plus the two implementations the server
//! picks between at startup.

mod flat;
mod quaderno;

pub use flat::{FLAT_TAX_RATE, FlatRateTax};
pub use quaderno::{QuadernoConfig, QuadernoTax};

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shop_core::Destination;

use crate::error::Result;

/// Tax owed on an amount
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuote {
    /// Tax to add on top of the taxable amount
    pub tax_amount: Decimal,

    /// Effective rate as a percentage
    pub rate: Decimal,

    /// Taxable amount plus tax
    pub total_amount: Decimal,
}

/// Tax calculator trait (Strategy pattern)
///
/// Implementations must never return a negative tax for a non-negative amount.
#[async_trait]
pub trait TaxCalculator: Send + Sync {
    /// Quote tax on `amount` (which excludes tax) shipped to `destination`
    async fn calculate_tax(&self, amount: Decimal, destination: &Destination) -> Result<TaxQuote>;

    /// Calculator name, for logs and health output
    fn name(&self) -> &str;
}

/// Choose the tax strategy once from configuration
///
/// A configured Quaderno API key selects the remote calculator; without one
/// every quote uses the flat rate.
pub fn from_config(config: &QuadernoConfig) -> Result<Arc<dyn TaxCalculator>> {
    if config.is_enabled() {
        tracing::info!(base_url = %config.base_url, "Tax: using Quaderno");
        Ok(Arc::new(QuadernoTax::new(config.clone())?))
    } else {
        tracing::info!(rate = %FLAT_TAX_RATE, "Tax: Quaderno not configured, using flat rate");
        Ok(Arc::new(FlatRateTax))
    }
}
