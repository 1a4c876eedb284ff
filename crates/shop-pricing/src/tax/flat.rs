//! Flat-Rate Tax
//!
//! Used when no tax service is configured, and as the fallback when the tax
//! service says the merchant is not registered in the destination.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shop_core::{Destination, ModelError};

use super::{TaxCalculator, TaxQuote};
use crate::error::{PricingError, Result};

/// Flat tax rate as a fraction (10%)
pub const FLAT_TAX_RATE: Decimal = dec!(0.10);

/// Applies [`FLAT_TAX_RATE`] regardless of destination
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatRateTax;

impl FlatRateTax {
    /// Quote without going through the trait; pure, fails only on overflow
    pub fn quote(amount: Decimal) -> Result<TaxQuote> {
        let too_large = || PricingError::from(ModelError::InvalidPricing(format!("{amount} is too large to tax")));

        let tax_amount = amount.checked_mul(FLAT_TAX_RATE).ok_or_else(too_large)?;
        let total_amount = amount.checked_add(tax_amount).ok_or_else(too_large)?;

        Ok(TaxQuote {
            tax_amount,
            rate: FLAT_TAX_RATE * Decimal::ONE_HUNDRED,
            total_amount,
        })
    }
}

#[async_trait]
impl TaxCalculator for FlatRateTax {
    async fn calculate_tax(&self, amount: Decimal, _destination: &Destination) -> Result<TaxQuote> {
        Self::quote(amount)
    }

    fn name(&self) -> &str {
        "flat-rate"
    }
}
