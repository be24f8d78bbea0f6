//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as REAL; every sum goes through `Decimal` and is rounded
//! back to 2 decimal places before it is written.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `unit_price × quantity`
pub fn line_total(unit_price: f64, quantity: i32) -> Decimal {
    (to_decimal(unit_price) * Decimal::from(quantity))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Order total from `(price_at_time, quantity)` pairs
pub fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i32)>,
{
    let sum: Decimal = lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum();
    to_f64(sum)
}

/// Price must be finite, non-negative and below [`MAX_PRICE`]
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && (0.0..=MAX_PRICE).contains(&price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_two_a_one_b() {
        // 2 × 5.00 + 1 × 3.00
        assert_eq!(order_total([(5.0, 2), (3.0, 1)]), 13.0);
    }

    #[test]
    fn test_float_drift_is_rounded_away() {
        // 0.1 + 0.2 in f64 is 0.30000000000000004
        assert_eq!(order_total([(0.1, 1), (0.2, 1)]), 0.3);
        assert_eq!(order_total([(12.99, 3)]), 38.97);
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(order_total(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_price_validation() {
        assert!(is_valid_price(0.0));
        assert!(is_valid_price(8.99));
        assert!(!is_valid_price(-0.01));
        assert!(!is_valid_price(f64::NAN));
        assert!(!is_valid_price(f64::INFINITY));
        assert!(!is_valid_price(MAX_PRICE + 1.0));
    }
}
