//! Offset reconstruction from two corner distances (Heron's formula).

use rust_decimal::Decimal;

use super::Offset;
use crate::util::math::sqrt_or_zero;

/// Recovers a point's box-local offset from its distances to the top-left and
/// bottom-left corners and the length of the left edge joining them.
///
/// The three lengths form a triangle; its height over the left edge is the
/// perpendicular offset `x`, and `y` follows from Pythagoras on the top-left
/// distance. Inconsistent inputs (negative Heron product, non-positive edge,
/// overflow) yield [`Offset::ZERO`] instead of an error.
pub fn reconstruct_offset(
    to_top_left: Decimal,
    to_bottom_left: Decimal,
    edge_length: Decimal,
) -> Offset {
    if edge_length <= Decimal::ZERO {
        return Offset::ZERO;
    }
    let Some(area_sq) = heron_product(to_top_left, to_bottom_left, edge_length) else {
        return Offset::ZERO;
    };
    if area_sq < Decimal::ZERO {
        return Offset::ZERO;
    }

    let x = sqrt_or_zero(area_sq) * Decimal::TWO / edge_length;
    let y = match to_top_left
        .checked_mul(to_top_left)
        .and_then(|a2| x.checked_mul(x).and_then(|x2| a2.checked_sub(x2)))
    {
        Some(radicand) => sqrt_or_zero(radicand),
        None => Decimal::ZERO,
    };
    Offset { x, y }
}

/// Returns `s(s-a)(s-b)(s-c)`, the squared triangle area.
fn heron_product(a: Decimal, b: Decimal, c: Decimal) -> Option<Decimal> {
    let s = a.checked_add(b)?.checked_add(c)? / Decimal::TWO;
    s.checked_mul(s - a)?.checked_mul(s - b)?.checked_mul(s - c)
}

#[cfg(test)]
mod tests {
    use super::reconstruct_offset;
    use crate::geometry::Offset;
    use rust_decimal::Decimal;

    fn close(a: Decimal, b: i64) -> bool {
        (a - Decimal::from(b)).abs() < Decimal::new(1, 15)
    }

    #[test]
    fn recovers_right_triangle_offset() {
        // Point at (3, 4) in a box whose left edge is 8 long.
        let offset = reconstruct_offset(Decimal::from(5), Decimal::from(5), Decimal::from(8));
        assert!(close(offset.x, 3), "x = {}", offset.x);
        assert!(close(offset.y, 4), "y = {}", offset.y);
    }

    #[test]
    fn point_on_the_edge_has_zero_perpendicular_offset() {
        let offset = reconstruct_offset(Decimal::from(3), Decimal::from(5), Decimal::from(8));
        assert!(close(offset.x, 0));
        assert!(close(offset.y, 3));
    }

    #[test]
    fn violated_triangle_inequality_yields_zero() {
        let offset = reconstruct_offset(Decimal::from(1), Decimal::from(1), Decimal::from(5));
        assert_eq!(offset, Offset::ZERO);
        let offset = reconstruct_offset(Decimal::from(10), Decimal::from(1), Decimal::from(5));
        assert_eq!(offset, Offset::ZERO);
    }

    #[test]
    fn zero_edge_yields_zero() {
        let offset = reconstruct_offset(Decimal::from(3), Decimal::from(4), Decimal::ZERO);
        assert_eq!(offset, Offset::ZERO);
    }
}
