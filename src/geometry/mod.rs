//! Box-frame geometry: corner roles, points and offset reconstruction.
//!
//! A measured piece is enclosed by a rotated box whose corners are labelled
//! clockwise from the top-left. Feature positions are recorded only as
//! distances to those corners; [`reconstruct_offset`] recovers a box-local
//! offset from them and [`map_to_image_frame`] places that offset back in
//! image pixels.

mod distance;
mod frame;
mod heron;

use std::ops::{Index, IndexMut};

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use distance::pixel_distance;
pub use frame::map_to_image_frame;
pub use heron::reconstruct_offset;

/// Corner role of the enclosing box, clockwise from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in clockwise order starting at the top-left.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Returns the clockwise position of the corner (top-left is 0).
    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }

    /// Returns the corner `steps` positions further clockwise.
    pub fn clockwise(self, steps: usize) -> Corner {
        Corner::ALL[(self.index() + steps) % 4]
    }

    /// Returns the snake_case name used in stored records.
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomRight => "bottom_right",
            Corner::BottomLeft => "bottom_left",
        }
    }
}

/// One value per box corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerMap<T> {
    pub top_left: T,
    pub top_right: T,
    pub bottom_right: T,
    pub bottom_left: T,
}

impl<T> CornerMap<T> {
    /// Builds a map by evaluating `f` for each corner in clockwise order.
    pub fn from_fn(mut f: impl FnMut(Corner) -> T) -> Self {
        Self {
            top_left: f(Corner::TopLeft),
            top_right: f(Corner::TopRight),
            bottom_right: f(Corner::BottomRight),
            bottom_left: f(Corner::BottomLeft),
        }
    }

    /// Applies `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> CornerMap<U> {
        CornerMap {
            top_left: f(&self.top_left),
            top_right: f(&self.top_right),
            bottom_right: f(&self.bottom_right),
            bottom_left: f(&self.bottom_left),
        }
    }

    /// Iterates values in clockwise order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [
            &self.top_left,
            &self.top_right,
            &self.bottom_right,
            &self.bottom_left,
        ]
        .into_iter()
    }

    /// Mutable references to the values in clockwise order.
    pub fn values_mut(&mut self) -> [&mut T; 4] {
        [
            &mut self.top_left,
            &mut self.top_right,
            &mut self.bottom_right,
            &mut self.bottom_left,
        ]
    }
}

impl<T> Index<Corner> for CornerMap<T> {
    type Output = T;

    fn index(&self, corner: Corner) -> &T {
        match corner {
            Corner::TopLeft => &self.top_left,
            Corner::TopRight => &self.top_right,
            Corner::BottomRight => &self.bottom_right,
            Corner::BottomLeft => &self.bottom_left,
        }
    }
}

impl<T> IndexMut<Corner> for CornerMap<T> {
    fn index_mut(&mut self, corner: Corner) -> &mut T {
        match corner {
            Corner::TopLeft => &mut self.top_left,
            Corner::TopRight => &mut self.top_right,
            Corner::BottomRight => &mut self.bottom_right,
            Corner::BottomLeft => &mut self.bottom_left,
        }
    }
}

/// Integer pixel position in the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Decimal-valued point, used for millimetre positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecimalPoint {
    pub x: Decimal,
    pub y: Decimal,
}

/// Offset of a point from the box top-left corner, in the box's own frame.
///
/// `x` is the perpendicular distance from the left edge, `y` the distance
/// along the left edge measured from the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset {
    pub x: Decimal,
    pub y: Decimal,
}

impl Offset {
    pub const ZERO: Offset = Offset {
        x: Decimal::ZERO,
        y: Decimal::ZERO,
    };

    /// Scales both components, e.g. by `mm_to_px` to get millimetres.
    pub fn scaled(self, factor: Decimal) -> DecimalPoint {
        DecimalPoint {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Corner, CornerMap};

    #[test]
    fn clockwise_wraps_around() {
        assert_eq!(Corner::TopLeft.clockwise(1), Corner::TopRight);
        assert_eq!(Corner::BottomLeft.clockwise(1), Corner::TopLeft);
        assert_eq!(Corner::TopRight.clockwise(3), Corner::TopLeft);
    }

    #[test]
    fn corner_map_indexes_by_role() {
        let map = CornerMap::from_fn(|corner| corner.index() * 10);
        assert_eq!(map[Corner::BottomRight], 20);
        assert_eq!(map.iter().copied().collect::<Vec<_>>(), vec![0, 10, 20, 30]);
    }
}
