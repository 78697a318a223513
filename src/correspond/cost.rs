//! Matching costs between a detected area and a template area.

use rust_decimal::Decimal;

use super::Rotation;
use crate::geometry::Corner;
use crate::sample::DetectedArea;
use crate::template::TemplateArea;

/// Sum of absolute differences over all four corner distances, with the
/// detected corners relabelled by `rotation`.
pub fn corner_cost(
    detected: &DetectedArea,
    template: &TemplateArea,
    rotation: Rotation,
) -> Decimal {
    Corner::ALL
        .iter()
        .map(|&label| label_diff(detected, template, rotation, label))
        .sum()
}

/// Sum of absolute differences over the top-left and bottom-left distances
/// only; used once the rotation is fixed.
pub fn edge_cost(
    detected: &DetectedArea,
    template: &TemplateArea,
    rotation: Rotation,
) -> Decimal {
    label_diff(detected, template, rotation, Corner::BottomLeft)
        + label_diff(detected, template, rotation, Corner::TopLeft)
}

fn label_diff(
    detected: &DetectedArea,
    template: &TemplateArea,
    rotation: Rotation,
    label: Corner,
) -> Decimal {
    (detected.distance_px_as(rotation, label) - template.stats.mean.distance_px[label]).abs()
}
