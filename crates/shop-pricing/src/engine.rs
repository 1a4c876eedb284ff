//! Pricing Engine
//!
//! Turns cart contents, a destination and a shipping fee into a
//! [`PricingBreakdown`]. The engine itself is deterministic: any randomness
//! lives in the shipping estimator that produced the fee.

use std::sync::Arc;

use rust_decimal::Decimal;
use shop_core::{Cart, CartItem, Destination, ModelError, PricingBreakdown, round2};

use crate::error::Result;
use crate::tax::{FlatRateTax, TaxCalculator};

/// Computes price breakdowns
#[derive(Clone)]
pub struct PricingEngine {
    tax: Arc<dyn TaxCalculator>,
}

impl PricingEngine {
    pub fn new(tax: Arc<dyn TaxCalculator>) -> Self {
        Self { tax }
    }

    /// The tax strategy in use
    pub fn tax_calculator(&self) -> &dyn TaxCalculator {
        self.tax.as_ref()
    }

    /// Compute the breakdown for `items`
    ///
    /// Shipping that has not been quoted yet counts as zero. Tax is charged on
    /// subtotal plus shipping. Without a destination (the cart page, before
    /// the address form) the flat rate stands in as an estimate; an empty
    /// cart simply prices at zero.
    ///
    /// A negative shipping fee, or amounts too large to represent, are
    /// rejected as [`PricingError::Validation`](crate::PricingError::Validation).
    pub async fn compute_pricing(
        &self,
        items: &[CartItem],
        destination: Option<&Destination>,
        shipping_amount: Option<Decimal>,
    ) -> Result<PricingBreakdown> {
        let subtotal = Cart::subtotal_of(items)?;
        let shipping = round2(shipping_amount.unwrap_or_default());
        if shipping.is_sign_negative() && !shipping.is_zero() {
            return Err(ModelError::InvalidPricing(format!("shipping amount {shipping} must not be negative")).into());
        }

        let amount_for_tax = subtotal
            .checked_add(shipping)
            .ok_or_else(|| ModelError::InvalidPricing("order amount is too large".into()))?;

        let quote = match destination {
            Some(destination) => self.tax.calculate_tax(amount_for_tax, destination).await?,
            None => FlatRateTax::quote(amount_for_tax)?,
        };

        let pricing = PricingBreakdown {
            subtotal,
            tax: round2(quote.tax_amount),
            shipping,
            total: round2(quote.total_amount),
            tax_rate: Some(quote.rate),
        };

        tracing::debug!(
            subtotal = %pricing.subtotal,
            tax = %pricing.tax,
            shipping = %pricing.shipping,
            total = %pricing.total,
            calculator = self.tax.name(),
            "Computed pricing"
        );

        Ok(pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::shipping::{FlatShippingEstimator, ShippingEstimator};
    use crate::tax::TaxQuote;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use shop_core::Book;
    use std::sync::Mutex;

    /// Fixed-rate calculator that records the amounts it was asked about
    struct RecordingTax {
        rate: Decimal,
        seen: Mutex<Vec<Decimal>>,
    }

    impl RecordingTax {
        fn new(rate_percent: Decimal) -> Self {
            Self {
                rate: rate_percent,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TaxCalculator for RecordingTax {
        async fn calculate_tax(&self, amount: Decimal, _destination: &Destination) -> Result<TaxQuote> {
            self.seen.lock().unwrap().push(amount);
            let tax_amount = amount * self.rate / Decimal::ONE_HUNDRED;
            Ok(TaxQuote {
                tax_amount,
                rate: self.rate,
                total_amount: amount + tax_amount,
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingTax;

    #[async_trait]
    impl TaxCalculator for FailingTax {
        async fn calculate_tax(&self, _amount: Decimal, _destination: &Destination) -> Result<TaxQuote> {
            Err(PricingError::TaxService {
                status: 502,
                body: "bad gateway".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn flat_engine() -> PricingEngine {
        PricingEngine::new(Arc::new(FlatRateTax))
    }

    fn destination() -> Destination {
        Destination::new("US", "10001")
    }

    fn items(lines: &[(Decimal, u32)]) -> Vec<CartItem> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (price, qty))| CartItem::new(Book::new(i.to_string(), "Book", *price), *qty))
            .collect()
    }

    #[tokio::test]
    async fn test_flat_rate_checkout_example() {
        let pricing = flat_engine()
            .compute_pricing(&items(&[(dec!(10.00), 2)]), Some(&destination()), Some(dec!(5.00)))
            .await
            .unwrap();

        assert_eq!(pricing.subtotal, dec!(20.00));
        assert_eq!(pricing.tax, dec!(2.50));
        assert_eq!(pricing.shipping, dec!(5.00));
        assert_eq!(pricing.total, dec!(27.50));
        assert_eq!(pricing.tax_rate, Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_tax_is_charged_on_subtotal_plus_shipping() {
        let tax = Arc::new(RecordingTax::new(dec!(8.875)));
        let engine = PricingEngine::new(tax.clone());

        engine
            .compute_pricing(&items(&[(dec!(12.99), 1), (dec!(13.99), 2)]), Some(&destination()), Some(dec!(7.25)))
            .await
            .unwrap();

        assert_eq!(*tax.seen.lock().unwrap(), vec![dec!(48.22)]);
    }

    #[tokio::test]
    async fn test_missing_shipping_counts_as_zero() {
        let pricing = flat_engine()
            .compute_pricing(&items(&[(dec!(10.00), 1)]), Some(&destination()), None)
            .await
            .unwrap();

        assert_eq!(pricing.shipping, Decimal::ZERO);
        assert_eq!(pricing.tax, dec!(1.00));
        assert_eq!(pricing.total, dec!(11.00));
    }

    #[tokio::test]
    async fn test_empty_cart_prices_at_zero() {
        let pricing = flat_engine()
            .compute_pricing(&[], Some(&destination()), None)
            .await
            .unwrap();

        assert_eq!(pricing.subtotal, Decimal::ZERO);
        assert_eq!(pricing.tax, Decimal::ZERO);
        assert_eq!(pricing.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_without_destination_uses_flat_estimate() {
        let tax = Arc::new(RecordingTax::new(dec!(20)));
        let engine = PricingEngine::new(tax.clone());

        let pricing = engine
            .compute_pricing(&items(&[(dec!(10.00), 1)]), None, None)
            .await
            .unwrap();

        assert!(tax.seen.lock().unwrap().is_empty());
        assert_eq!(pricing.tax, dec!(1.00));
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_pricing() {
        let engine = PricingEngine::new(Arc::new(RecordingTax::new(dec!(8.875))));
        let shipping = FlatShippingEstimator::new(dec!(6.49));
        let cart = items(&[(dec!(12.49), 3), (dec!(15.99), 1)]);

        let first = engine
            .compute_pricing(&cart, Some(&destination()), Some(shipping.estimate_shipping(&destination())))
            .await
            .unwrap();
        let second = engine
            .compute_pricing(&cart, Some(&destination()), Some(shipping.estimate_shipping(&destination())))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    }

    #[tokio::test]
    async fn test_total_matches_components_within_a_cent() {
        let engine = PricingEngine::new(Arc::new(RecordingTax::new(dec!(8.875))));
        let prices = [dec!(0.01), dec!(0.99), dec!(11.99), dec!(12.49), dec!(333.33)];
        let fees = [Decimal::ZERO, dec!(5.00), dec!(7.77), dec!(14.99)];

        for price in prices {
            for qty in 1..=7 {
                for fee in fees {
                    let pricing = engine
                        .compute_pricing(&items(&[(price, qty)]), Some(&destination()), Some(fee))
                        .await
                        .unwrap();
                    assert!(
                        pricing.is_consistent(),
                        "inconsistent breakdown for {price} x {qty} + {fee}: {pricing:?}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_negative_shipping_is_rejected() {
        let tax = Arc::new(RecordingTax::new(dec!(10)));
        let engine = PricingEngine::new(tax.clone());

        for destination in [Some(destination()), None] {
            let result = engine
                .compute_pricing(&items(&[(dec!(10.00), 2)]), destination.as_ref(), Some(dec!(-30)))
                .await;

            assert!(matches!(result, Err(PricingError::Validation(ModelError::InvalidPricing(_)))));
        }
        assert!(tax.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_zero_shipping_is_zero() {
        let pricing = flat_engine()
            .compute_pricing(&items(&[(dec!(10.00), 1)]), Some(&destination()), Some(dec!(-0.001)))
            .await
            .unwrap();

        assert!(pricing.shipping.is_zero());
        assert_eq!(pricing.total, dec!(11.00));
    }

    #[tokio::test]
    async fn test_oversized_cart_is_rejected() {
        let price = Decimal::from_i128_with_scale(10_i128.pow(25), 0);
        let result = flat_engine()
            .compute_pricing(&items(&[(price, 100_000)]), Some(&destination()), None)
            .await;

        assert!(matches!(
            result,
            Err(PricingError::Validation(ModelError::InvalidCartItem { .. }))
        ));
    }

    #[tokio::test]
    async fn test_subtotal_near_limit_fails_at_tax_step() {
        let result = flat_engine()
            .compute_pricing(&items(&[(Decimal::MAX, 1)]), None, None)
            .await;

        assert!(matches!(result, Err(PricingError::Validation(ModelError::InvalidPricing(_)))));
    }

    #[tokio::test]
    async fn test_tax_failure_propagates() {
        let engine = PricingEngine::new(Arc::new(FailingTax));
        let result = engine
            .compute_pricing(&items(&[(dec!(1), 1)]), Some(&destination()), None)
            .await;

        assert!(matches!(result, Err(PricingError::TaxService { status: 502, .. })));
    }
}
