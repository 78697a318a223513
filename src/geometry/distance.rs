use rust_decimal::Decimal;

use super::PixelPoint;
use crate::util::math::sqrt_or_zero;

/// Euclidean distance between two pixel positions.
pub fn pixel_distance(a: PixelPoint, b: PixelPoint) -> Decimal {
    let dx = Decimal::from(b.x - a.x);
    let dy = Decimal::from(b.y - a.y);
    sqrt_or_zero(dx * dx + dy * dy)
}
