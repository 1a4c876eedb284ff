//! Shipping Estimation
//!
//! There is no carrier integration yet: the default estimator draws a random
//! fee from a bounded range. Callers only rely on "destination in,
//! non-negative fee in a known range out", so a carrier-backed estimator can
//! replace it without touching the pricing or checkout code.

use std::sync::Arc;

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use shop_core::money::{from_cents, round2};
use shop_core::{Destination, env};

use crate::error::{PricingError, Result};

/// Shipping estimator trait (Strategy pattern)
pub trait ShippingEstimator: Send + Sync {
    /// Fee to ship an order to `destination`
    fn estimate_shipping(&self, destination: &Destination) -> Decimal;

    fn name(&self) -> &str;
}

/// Uniformly random fee in whole cents between `min` and `max` (inclusive)
#[derive(Clone, Debug)]
pub struct RandomShippingEstimator {
    min_cents: i64,
    max_cents: i64,
}

impl Default for RandomShippingEstimator {
    fn default() -> Self {
        Self::new(dec!(5.00), dec!(15.00))
    }
}

impl RandomShippingEstimator {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        let to_cents = |d: Decimal| {
            (round2(d.max(Decimal::ZERO)) * Decimal::ONE_HUNDRED)
                .to_i64()
                .unwrap_or(0)
        };
        let (a, b) = (to_cents(min), to_cents(max));

        Self {
            min_cents: a.min(b),
            max_cents: a.max(b),
        }
    }

    pub fn min(&self) -> Decimal {
        from_cents(self.min_cents)
    }

    pub fn max(&self) -> Decimal {
        from_cents(self.max_cents)
    }
}

impl ShippingEstimator for RandomShippingEstimator {
    fn estimate_shipping(&self, _destination: &Destination) -> Decimal {
        let cents = rand::thread_rng().gen_range(self.min_cents..=self.max_cents);
        from_cents(cents)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Same fee for every destination
#[derive(Clone, Debug)]
pub struct FlatShippingEstimator {
    fee: Decimal,
}

impl FlatShippingEstimator {
    pub fn new(fee: Decimal) -> Self {
        Self {
            fee: round2(fee.max(Decimal::ZERO)),
        }
    }
}

impl ShippingEstimator for FlatShippingEstimator {
    fn estimate_shipping(&self, _destination: &Destination) -> Decimal {
        self.fee
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// Shipping configuration
#[derive(Clone, Debug)]
pub struct ShippingConfig {
    /// Fixed fee; `None` selects the random placeholder estimator
    pub flat_amount: Option<Decimal>,

    /// Lower bound for random fees
    pub min: Decimal,

    /// Upper bound for random fees
    pub max: Decimal,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            flat_amount: None,
            min: dec!(5.00),
            max: dec!(15.00),
        }
    }
}

impl ShippingConfig {
    pub fn from_env() -> Result<Self> {
        let flat_amount = env::optional("SHIPPING_FLAT_AMOUNT")
            .map(|raw| {
                raw.parse::<Decimal>().map_err(|e| {
                    PricingError::Config(format!("Invalid SHIPPING_FLAT_AMOUNT '{raw}': {e}"))
                })
            })
            .transpose()?;

        if flat_amount.is_some_and(|fee| fee.is_sign_negative() && !fee.is_zero()) {
            return Err(PricingError::Config("SHIPPING_FLAT_AMOUNT must not be negative".into()));
        }

        Ok(Self {
            flat_amount,
            ..Default::default()
        })
    }
}

/// Choose the shipping strategy once from configuration
pub fn from_config(config: &ShippingConfig) -> Arc<dyn ShippingEstimator> {
    match config.flat_amount {
        Some(fee) => {
            tracing::info!(fee = %fee, "Shipping: flat fee");
            Arc::new(FlatShippingEstimator::new(fee))
        }
        None => {
            tracing::info!(min = %config.min, max = %config.max, "Shipping: random placeholder fee");
            Arc::new(RandomShippingEstimator::new(config.min, config.max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anywhere() -> Destination {
        Destination::new("US", "10001")
    }

    #[test]
    fn test_random_fee_stays_in_range() {
        let estimator = RandomShippingEstimator::default();
        for _ in 0..500 {
            let fee = estimator.estimate_shipping(&anywhere());
            assert!(fee >= dec!(5.00) && fee <= dec!(15.00), "fee {fee} out of range");
            assert_eq!(fee, round2(fee));
        }
    }

    #[test]
    fn test_random_bounds_are_normalised() {
        let estimator = RandomShippingEstimator::new(dec!(9.999), dec!(2));
        assert_eq!(estimator.min(), dec!(2.00));
        assert_eq!(estimator.max(), dec!(10.00));
    }

    #[test]
    fn test_flat_fee() {
        let estimator = FlatShippingEstimator::new(dec!(5));
        assert_eq!(estimator.estimate_shipping(&anywhere()), dec!(5.00));
    }

    #[test]
    fn test_from_config_selects_strategy() {
        let flat = from_config(&ShippingConfig {
            flat_amount: Some(dec!(7.5)),
            ..Default::default()
        });
        assert_eq!(flat.name(), "flat");
        assert_eq!(flat.estimate_shipping(&anywhere()), dec!(7.50));

        let random = from_config(&ShippingConfig::default());
        assert_eq!(random.name(), "random");
    }
}
