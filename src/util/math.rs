//! Decimal helpers for statistics and geometric reconstruction.

use rust_decimal::prelude::{FromPrimitive, MathematicalOps, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Square root that maps non-positive or unrepresentable radicands to zero.
pub(crate) fn sqrt_or_zero(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value.sqrt().unwrap_or(Decimal::ZERO)
}

/// Rounds half-to-even to the nearest integer pixel.
pub(crate) fn round_to_pixel(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .unwrap_or(0)
}

/// Lossy bridge to `f64` for trigonometry.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Converts an `f64` back to a decimal, mapping non-finite values to zero.
pub(crate) fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::{from_f64, round_to_pixel, sqrt_or_zero};
    use rust_decimal::Decimal;

    #[test]
    fn sqrt_of_negative_is_zero() {
        assert_eq!(sqrt_or_zero(Decimal::new(-4, 0)), Decimal::ZERO);
        assert_eq!(sqrt_or_zero(Decimal::ZERO), Decimal::ZERO);
        let root = sqrt_or_zero(Decimal::new(16, 0));
        assert!((root - Decimal::new(4, 0)).abs() < Decimal::new(1, 20));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to_pixel(Decimal::new(25, 1)), 2);
        assert_eq!(round_to_pixel(Decimal::new(35, 1)), 4);
        assert_eq!(round_to_pixel(Decimal::new(-26, 1)), -3);
    }

    #[test]
    fn non_finite_floats_become_zero() {
        assert_eq!(from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(from_f64(0.5), Decimal::new(5, 1));
    }
}
