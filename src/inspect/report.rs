//! Structured defect report returned by the comparator.

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Corner, DecimalPoint, PixelPoint};
use crate::sample::CalibrationCheck;

/// Why an area was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FindingKind {
    /// Centroid outside the tolerance band.
    Center,
    /// Area size outside the tolerance band.
    Area,
    /// Both centroid and size outside their bands.
    Both,
    /// Template area not found in the sample.
    Unexistent,
    /// Detected area with no template counterpart.
    Unexpected,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::Center => "center",
            FindingKind::Area => "area",
            FindingKind::Both => "both",
            FindingKind::Unexistent => "unexistent",
            FindingKind::Unexpected => "unexpected",
        }
    }
}

/// One reported area with its expected and tolerated position and size.
///
/// `correct_*` values are the template's prediction (or, for unexpected
/// areas, the detected area itself); `error_*` values are reconstructed from
/// the template's standard errors and are zero when there is no template
/// reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Finding {
    /// Template id, or `-1` for unexpected areas.
    pub id: i64,
    pub kind: FindingKind,
    pub correct_center_mm: DecimalPoint,
    pub error_center_mm: DecimalPoint,
    pub correct_center_px: PixelPoint,
    pub error_center_px: PixelPoint,
    pub correct_area_px: Decimal,
    pub error_area_px: Decimal,
    pub correct_area_mm: Decimal,
    pub error_area_mm: Decimal,
}

/// Reference box area reported when the sample box is out of tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxFinding {
    pub correct_area_mm: Decimal,
    pub error_area_mm: Decimal,
}

/// Context shared by every report.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportInfo {
    pub constants_correct: CalibrationCheck,
    /// Detected corners in template label order.
    pub rotate_correction: [Corner; 4],
    pub template_total_areas: usize,
    pub sample_size: u64,
}

/// Outcome of an inspection that found at least one defect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorReport {
    pub info: ReportInfo,
    pub is_total_areas_correct: bool,
    pub areas: Option<Vec<Finding>>,
    #[cfg_attr(feature = "serde", serde(rename = "box"))]
    pub box_error: Option<BoxFinding>,
}

impl ErrorReport {
    pub(crate) fn new(info: ReportInfo) -> Self {
        Self {
            info,
            is_total_areas_correct: true,
            areas: None,
            box_error: None,
        }
    }

    /// All per-area findings; empty when `areas` is absent.
    pub fn findings(&self) -> &[Finding] {
        self.areas.as_deref().unwrap_or(&[])
    }

    /// Findings of one kind.
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> + '_ {
        self.findings().iter().filter(move |f| f.kind == kind)
    }

    /// Finding for template id `id`, if any.
    pub fn finding_for(&self, id: usize) -> Option<&Finding> {
        self.findings().iter().find(|f| f.id == id as i64)
    }

    pub fn constants_correct(&self) -> bool {
        self.info.constants_correct.all_correct()
    }
}
