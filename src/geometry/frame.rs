//! Mapping box-local offsets to image pixel coordinates.

use rust_decimal::Decimal;

use super::{Offset, PixelPoint};
use crate::util::math::{from_f64, round_to_pixel, to_f64};

/// Places a box-local `offset` in image coordinates.
///
/// `top_left` and `bottom_left` are the image positions of the box's left
/// edge and `edge_length` its length. The box tilt is recovered from the edge
/// direction; which side it leans to is decided by comparing the two x
/// coordinates. A vertical left edge (or a non-positive `edge_length`) adds
/// the offset directly. Coordinates are rounded half-to-even.
pub fn map_to_image_frame(
    top_left: PixelPoint,
    bottom_left: PixelPoint,
    offset: Offset,
    edge_length: Decimal,
) -> PixelPoint {
    let tl_x = Decimal::from(top_left.x);
    let tl_y = Decimal::from(top_left.y);

    if edge_length <= Decimal::ZERO || top_left.x == bottom_left.x {
        return PixelPoint::new(
            round_to_pixel(tl_x + offset.x),
            round_to_pixel(tl_y + offset.y),
        );
    }

    if top_left.x < bottom_left.x {
        let (cos, sin) = tilt(top_left.x.abs_diff(bottom_left.x), edge_length);
        let x = tl_x + offset.y * cos + offset.x * sin;
        let y = tl_y + offset.y * sin - offset.x * cos;
        PixelPoint::new(round_to_pixel(x), round_to_pixel(y))
    } else {
        let (cos, sin) = tilt(top_left.y.abs_diff(bottom_left.y), edge_length);
        let x = tl_x - offset.y * sin + offset.x * cos;
        let y = tl_y + offset.y * cos + offset.x * sin;
        PixelPoint::new(round_to_pixel(x), round_to_pixel(y))
    }
}

/// Cosine (exact decimal ratio) and sine of the edge tilt.
fn tilt(leg: u64, edge_length: Decimal) -> (Decimal, Decimal) {
    let cos = (Decimal::from(leg) / edge_length).clamp(Decimal::ZERO, Decimal::ONE);
    let sin = from_f64(to_f64(cos).acos().sin());
    (cos, sin)
}
