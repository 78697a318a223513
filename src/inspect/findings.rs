//! Reconstruction of finding positions in millimetres and image pixels.

use rust_decimal::Decimal;

use super::report::{Finding, FindingKind};
use crate::correspond::Rotation;
use crate::geometry::{
    map_to_image_frame, reconstruct_offset, Corner, DecimalPoint, Offset, PixelPoint,
};
use crate::sample::{BoxInfo, DetectedArea, UNMATCHED_ID};
use crate::template::{Template, TemplateArea};

/// Template and sample frame against which findings are placed.
pub(crate) struct FindingFrame<'a> {
    template: &'a Template,
    bbox: &'a BoxInfo,
    rotation: Rotation,
}

impl<'a> FindingFrame<'a> {
    pub(crate) fn new(template: &'a Template, bbox: &'a BoxInfo, rotation: Rotation) -> Self {
        Self {
            template,
            bbox,
            rotation,
        }
    }

    /// Finding for a template area, positioned from its mean distances and
    /// toleranced by its standard errors.
    pub(crate) fn template_area(&self, area: &TemplateArea, kind: FindingKind) -> Finding {
        let box_stats = &self.template.info().stats;
        let stats = &area.stats;
        let correct = reconstruct_offset(
            stats.mean.distance_px[Corner::TopLeft],
            stats.mean.distance_px[Corner::BottomLeft],
            box_stats.mean.delta_px.y,
        );
        let error = reconstruct_offset(
            stats.error.distance_px[Corner::TopLeft],
            stats.error.distance_px[Corner::BottomLeft],
            box_stats.error.delta_px.y,
        );
        let mm = self.template.calibration().mm_to_px;
        Finding {
            id: area.id as i64,
            kind,
            correct_center_mm: correct.scaled(mm),
            error_center_mm: error.scaled(mm),
            correct_center_px: self.place(correct),
            error_center_px: self.place(error),
            correct_area_px: stats.mean.area_px,
            error_area_px: stats.error.area_px,
            correct_area_mm: stats.mean.area_mm,
            error_area_mm: stats.error.area_mm,
        }
    }

    /// Finding for a detected area with no template counterpart, positioned
    /// from its own distances. Error values are zero.
    pub(crate) fn unexpected(&self, area: &DetectedArea) -> Finding {
        let offset = reconstruct_offset(
            area.distance_px_as(self.rotation, Corner::TopLeft),
            area.distance_px_as(self.rotation, Corner::BottomLeft),
            self.bbox.left_edge_length(self.rotation),
        );
        Finding {
            id: UNMATCHED_ID,
            kind: FindingKind::Unexpected,
            correct_center_mm: offset.scaled(self.template.calibration().mm_to_px),
            error_center_mm: DecimalPoint::default(),
            correct_center_px: self.place(offset),
            error_center_px: PixelPoint::default(),
            correct_area_px: Decimal::from(area.area_px),
            error_area_px: Decimal::ZERO,
            correct_area_mm: area.area_mm,
            error_area_mm: Decimal::ZERO,
        }
    }

    fn place(&self, offset: Offset) -> PixelPoint {
        let (top_left, bottom_left) = self.bbox.anchor_corners(self.rotation);
        map_to_image_frame(
            top_left,
            bottom_left,
            offset,
            self.bbox.left_edge_length(self.rotation),
        )
    }
}
