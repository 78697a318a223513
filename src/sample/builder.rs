//! Construction of sample records from raw box and centroid measurements.

use super::{BoxInfo, Calibration, DetectedArea, Sample};
use crate::geometry::{pixel_distance, CornerMap, DecimalPoint, PixelPoint};

/// Assembles a [`Sample`] from the box corners and feature centroids.
///
/// Box width is the top-left to top-right distance, height the top-left to
/// bottom-left distance. Features receive sequential provisional ids in the
/// order they are added.
#[derive(Clone, Debug)]
pub struct SampleBuilder {
    corners: CornerMap<PixelPoint>,
    calibration: Calibration,
    areas: Vec<DetectedArea>,
}

impl SampleBuilder {
    pub fn new(corners: CornerMap<PixelPoint>, calibration: Calibration) -> Self {
        Self {
            corners,
            calibration,
            areas: Vec::new(),
        }
    }

    /// Adds a feature with centroid `centroid` covering `area_px` pixels.
    pub fn feature(mut self, centroid: PixelPoint, area_px: u64) -> Self {
        let id = self.areas.len() as i64;
        let distance_px = self.corners.map(|corner| pixel_distance(centroid, *corner));
        self.areas
            .push(DetectedArea::new(id, area_px, distance_px, &self.calibration));
        self
    }

    pub fn build(self) -> Sample {
        let delta_px = DecimalPoint {
            x: pixel_distance(self.corners.top_left, self.corners.top_right),
            y: pixel_distance(self.corners.top_left, self.corners.bottom_left),
        };
        let area_px = delta_px.x * delta_px.y;
        let mm = self.calibration.mm_to_px;
        let bbox = BoxInfo {
            corners: self.corners,
            delta_mm: DecimalPoint {
                x: delta_px.x * mm,
                y: delta_px.y * mm,
            },
            delta_px,
            area_mm: area_px * mm,
            area_px,
        };
        Sample::new(bbox, self.calibration, self.areas)
    }
}

impl From<SampleBuilder> for Sample {
    fn from(builder: SampleBuilder) -> Self {
        builder.build()
    }
}
