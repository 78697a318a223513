//! Measurement records of a single piece.
//!
//! A [`Sample`] is what the segmentation stage produces for one image: the
//! enclosing box, calibration constants and the detected areas with their
//! distances to the four box corners. Area ids in a fresh sample are
//! provisional; [`correspond`](crate::correspond()) maps them onto a
//! template's stable ids.

mod builder;

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::correspond::Rotation;
use crate::geometry::{Corner, CornerMap, DecimalPoint, PixelPoint};
use crate::stats::{AreaMeasures, BoxMeasures};

pub use builder::SampleBuilder;

/// Id written for a detected area with no template counterpart.
pub const UNMATCHED_ID: i64 = -1;

/// Pixel/millimetre conversion constants of the measuring setup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// Millimetres per pixel.
    pub mm_to_px: Decimal,
    /// Square millimetres per square pixel.
    pub mm_to_px_squared: Decimal,
}

impl Calibration {
    pub fn new(mm_to_px: Decimal, mm_to_px_squared: Decimal) -> Self {
        Self {
            mm_to_px,
            mm_to_px_squared,
        }
    }

    /// Compares each constant against `other` independently.
    pub fn check(&self, other: &Calibration) -> CalibrationCheck {
        CalibrationCheck {
            mm_to_px: self.mm_to_px == other.mm_to_px,
            mm_to_px_squared: self.mm_to_px_squared == other.mm_to_px_squared,
        }
    }
}

/// Per-constant equality flags produced by [`Calibration::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationCheck {
    pub mm_to_px: bool,
    pub mm_to_px_squared: bool,
}

impl CalibrationCheck {
    pub fn all_correct(&self) -> bool {
        self.mm_to_px && self.mm_to_px_squared
    }
}

impl Default for CalibrationCheck {
    fn default() -> Self {
        Self {
            mm_to_px: true,
            mm_to_px_squared: true,
        }
    }
}

/// Minimum-area box enclosing the piece.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxInfo {
    /// Corner positions in image pixels, clockwise from the top-left.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub corners: CornerMap<PixelPoint>,
    /// Box width (`x`, top edge) and height (`y`, left edge) in millimetres.
    pub delta_mm: DecimalPoint,
    /// Box width and height in pixels.
    pub delta_px: DecimalPoint,
    pub area_mm: Decimal,
    pub area_px: Decimal,
}

impl BoxInfo {
    pub fn corner(&self, corner: Corner) -> PixelPoint {
        self.corners[corner]
    }

    /// Image positions of the detected corners playing the template's
    /// top-left and bottom-left roles under `rotation`.
    pub fn anchor_corners(&self, rotation: Rotation) -> (PixelPoint, PixelPoint) {
        (
            self.corner(rotation.detected_corner(Corner::TopLeft)),
            self.corner(rotation.detected_corner(Corner::BottomLeft)),
        )
    }

    /// Length of the detected edge playing the template's left edge.
    pub fn left_edge_length(&self, rotation: Rotation) -> Decimal {
        if rotation.steps() % 2 == 0 {
            self.delta_px.y
        } else {
            self.delta_px.x
        }
    }

    /// Scalar fields folded into a template's box statistics.
    pub fn measures(&self) -> BoxMeasures {
        BoxMeasures {
            area_mm: self.area_mm,
            area_px: self.area_px,
            delta_mm: self.delta_mm,
            delta_px: self.delta_px,
        }
    }
}

/// Global part of a sample record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleInfo {
    #[cfg_attr(feature = "serde", serde(rename = "box"))]
    pub bbox: BoxInfo,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub calibration: Calibration,
}

/// One detected sub-feature of the piece.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectedArea {
    /// Provisional id from segmentation, or the template id once corresponded.
    pub id: i64,
    pub area_mm: Decimal,
    pub area_px: u64,
    /// Centroid distance to each box corner, in pixels.
    pub distance_px: CornerMap<Decimal>,
    /// Centroid distance to each box corner, in millimetres.
    pub distance_mm: CornerMap<Decimal>,
}

impl DetectedArea {
    /// Builds an area from pixel measurements, deriving the millimetre fields.
    pub fn new(
        id: i64,
        area_px: u64,
        distance_px: CornerMap<Decimal>,
        calibration: &Calibration,
    ) -> Self {
        Self {
            id,
            area_mm: Decimal::from(area_px) * calibration.mm_to_px_squared,
            area_px,
            distance_mm: distance_px.map(|d| *d * calibration.mm_to_px),
            distance_px,
        }
    }

    /// Pixel distance from the detected corner playing template role `label`.
    pub fn distance_px_as(&self, rotation: Rotation, label: Corner) -> Decimal {
        self.distance_px[rotation.detected_corner(label)]
    }

    /// Scalar fields in the template's corner frame, ready to fold.
    pub fn measures(&self, rotation: Rotation) -> AreaMeasures {
        AreaMeasures {
            area_mm: self.area_mm,
            area_px: Decimal::from(self.area_px),
            distance_px: CornerMap::from_fn(|label| self.distance_px_as(rotation, label)),
            distance_mm: CornerMap::from_fn(|label| {
                self.distance_mm[rotation.detected_corner(label)]
            }),
        }
    }
}

/// One measurement of one physical piece.
///
/// The stored record also carries `info.total_areas`; it is written from
/// `areas.len()` and ignored when reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Sample {
    pub info: SampleInfo,
    pub areas: Vec<DetectedArea>,
}

impl Sample {
    pub fn new(bbox: BoxInfo, calibration: Calibration, areas: Vec<DetectedArea>) -> Self {
        Self {
            info: SampleInfo { bbox, calibration },
            areas,
        }
    }

    pub fn bbox(&self) -> &BoxInfo {
        &self.info.bbox
    }

    pub fn calibration(&self) -> &Calibration {
        &self.info.calibration
    }

    /// Number of detected areas.
    pub fn total_areas(&self) -> usize {
        self.areas.len()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Sample {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct InfoRecord<'a> {
            #[serde(rename = "box")]
            bbox: &'a BoxInfo,
            total_areas: usize,
            #[serde(flatten)]
            calibration: &'a Calibration,
        }

        #[derive(Serialize)]
        struct Record<'a> {
            info: InfoRecord<'a>,
            areas: &'a [DetectedArea],
        }

        Record {
            info: InfoRecord {
                bbox: &self.info.bbox,
                total_areas: self.areas.len(),
                calibration: &self.info.calibration,
            },
            areas: &self.areas,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxInfo, Calibration, DetectedArea};
    use crate::correspond::Rotation;
    use crate::geometry::{Corner, CornerMap, DecimalPoint};
    use rust_decimal::Decimal;

    #[test]
    fn detected_area_derives_millimetres() {
        let calibration = Calibration::new(Decimal::new(2, 1), Decimal::new(4, 2));
        let area = DetectedArea::new(
            0,
            100,
            CornerMap::from_fn(|c| Decimal::from(10 * (c.index() + 1))),
            &calibration,
        );
        assert_eq!(area.area_mm, Decimal::from(4));
        assert_eq!(area.distance_mm.bottom_left, Decimal::from(8));
    }

    #[test]
    fn measures_follow_rotation() {
        let calibration = Calibration::new(Decimal::ONE, Decimal::ONE);
        let area = DetectedArea::new(
            0,
            1,
            CornerMap::from_fn(|c| Decimal::from(c.index())),
            &calibration,
        );
        let m = area.measures(Rotation::from_steps(1));
        assert_eq!(m.distance_px[Corner::TopLeft], Decimal::from(1));
        assert_eq!(m.distance_px[Corner::BottomLeft], Decimal::from(0));
        assert_eq!(m.distance_mm[Corner::TopRight], Decimal::from(2));
    }

    #[test]
    fn left_edge_swaps_on_quarter_turns() {
        let bbox = BoxInfo {
            delta_px: DecimalPoint {
                x: Decimal::from(300),
                y: Decimal::from(200),
            },
            ..BoxInfo::default()
        };
        assert_eq!(bbox.left_edge_length(Rotation::from_steps(0)), Decimal::from(200));
        assert_eq!(bbox.left_edge_length(Rotation::from_steps(1)), Decimal::from(300));
        assert_eq!(bbox.left_edge_length(Rotation::from_steps(2)), Decimal::from(200));
    }
}
