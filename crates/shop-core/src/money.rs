//! Money Helpers
//!
//! Cent rounding and wire formatting for USD amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// The only currency the storefront sells in
pub const CURRENCY: &str = "USD";

/// Round to cents, halves away from zero
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format as a fixed two-decimal string (e.g. `"20.00"`), the shape the
/// payment and tax APIs expect for amounts.
pub fn to_fixed2(amount: Decimal) -> String {
    let mut cents = round2(amount);
    cents.rescale(2);
    cents.to_string()
}

/// Build an amount from whole cents
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
        assert_eq!(round2(dec!(27.5)), dec!(27.50));
    }

    #[test]
    fn test_to_fixed2_pads_and_rounds() {
        assert_eq!(to_fixed2(dec!(20)), "20.00");
        assert_eq!(to_fixed2(dec!(12.9)), "12.90");
        assert_eq!(to_fixed2(dec!(1.005)), "1.01");
        assert_eq!(to_fixed2(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(from_cents(1299), dec!(12.99));
        assert_eq!(from_cents(500), dec!(5.00));
    }
}
