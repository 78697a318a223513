//! Tolerance comparison of a sample against a trained template.
//!
//! The comparator never fails: every violation becomes data in an
//! [`ErrorReport`]. A sample without findings is folded back into the
//! template so that inspection keeps refining it; a sample with findings
//! bumps the failure counters of the template areas it names.

mod findings;
mod report;

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::correspond::{correspond, Correspondence, Rotation};
use crate::geometry::Corner;
use crate::sample::{DetectedArea, Sample};
use crate::stats::Stat;
use crate::template::{Template, TemplateArea};
use crate::trace::{trace_event, trace_span, trace_warn};

use findings::FindingFrame;
pub use report::{BoxFinding, ErrorReport, Finding, FindingKind, ReportInfo};

/// How the box-area tolerance test combines its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoxAreaCheck {
    /// Flags the box when `area <= lower && area < upper`.
    ///
    /// This is the rule stored templates were validated with: it rejects
    /// boxes at or below the lower bound and never rejects oversized boxes.
    #[default]
    Legacy,
    /// Flags the box when it lies outside `[lower, upper]`.
    Band,
}

impl BoxAreaCheck {
    fn out_of_tolerance(self, area: Decimal, stat: &Stat, k: Decimal) -> bool {
        let (lower, upper) = stat.band(k);
        match self {
            BoxAreaCheck::Legacy => area <= lower && area < upper,
            BoxAreaCheck::Band => area < lower || area > upper,
        }
    }
}

/// Comparison configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompareConfig {
    /// Half-width of the tolerance band in standard deviations.
    pub sigma_multiplier: Decimal,
    pub box_area_check: BoxAreaCheck,
    /// Fold samples without findings into the template.
    pub refine_on_match: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            sigma_multiplier: Decimal::from(3),
            box_area_check: BoxAreaCheck::Legacy,
            refine_on_match: true,
        }
    }
}

/// Result of [`Comparator::evaluate`]; the template is left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    /// `None` when the sample matches the template within tolerance.
    pub report: Option<ErrorReport>,
    pub correspondence: Correspondence,
}

/// Result of [`Comparator::compare`], carrying the updated template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inspection {
    pub template: Template,
    /// `None` when the sample matches the template within tolerance.
    pub report: Option<ErrorReport>,
    pub correspondence: Correspondence,
}

impl Inspection {
    pub fn is_match(&self) -> bool {
        self.report.is_none()
    }
}

/// Compares samples against a template.
#[derive(Clone, Debug, Default)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Evaluates `sample` and applies the side effects to `template`: a match
    /// is folded in (unless disabled), a defect increments failure counters.
    pub fn compare(&self, sample: &Sample, mut template: Template) -> Inspection {
        let Evaluation {
            report,
            correspondence,
        } = self.evaluate(sample, &template);
        match &report {
            None if self.config.refine_on_match => {
                template = template.fold(sample, &correspondence);
            }
            None => {}
            Some(report) => template.record_failures(report),
        }
        Inspection {
            template,
            report,
            correspondence,
        }
    }

    /// Checks `sample` against `template` without modifying it.
    pub fn evaluate(&self, sample: &Sample, template: &Template) -> Evaluation {
        let _guard = trace_span!(
            "compare",
            sample_size = template.sample_size(),
            template_areas = template.total_areas(),
            detected_areas = sample.total_areas()
        )
        .entered();

        let constants_correct = template.calibration().check(sample.calibration());
        let mut any_error = !constants_correct.all_correct();
        if !constants_correct.mm_to_px {
            trace_warn!("mm_to_px differs from the template");
        }
        if !constants_correct.mm_to_px_squared {
            trace_warn!("mm_to_px_squared differs from the template");
        }

        let mut report = ErrorReport::new(ReportInfo {
            constants_correct,
            rotate_correction: Corner::ALL,
            template_total_areas: template.total_areas(),
            sample_size: template.sample_size(),
        });

        let box_stats = &template.info().stats;
        let box_area = box_stats.stat(|m| m.area_px);
        if self.config.box_area_check.out_of_tolerance(
            sample.bbox().area_px,
            &box_area,
            self.config.sigma_multiplier,
        ) {
            trace_warn!(
                "box area {} outside tolerance of mean {}",
                sample.bbox().area_px,
                box_area.mean
            );
            any_error = true;
            report.box_error = Some(BoxFinding {
                correct_area_mm: box_stats.mean.area_mm,
                error_area_mm: box_stats.error.area_mm,
            });
        }

        let expected = template.total_areas();
        let found = sample.total_areas();
        let identity = FindingFrame::new(template, sample.bbox(), Rotation::Identity);
        match (expected, found) {
            (0, 0) => {
                return Evaluation {
                    report: any_error.then_some(report),
                    correspondence: Correspondence::default(),
                };
            }
            (0, _) => {
                trace_warn!("template has no areas, sample has {}", found);
                report.is_total_areas_correct = false;
                report.areas = Some(
                    sample
                        .areas
                        .iter()
                        .map(|area| identity.unexpected(area))
                        .collect(),
                );
                return Evaluation {
                    report: Some(report),
                    correspondence: Correspondence::new(Rotation::Identity, vec![None; found]),
                };
            }
            (_, 0) => {
                trace_warn!("sample has no areas, template has {}", expected);
                report.is_total_areas_correct = false;
                report.areas = Some(
                    template
                        .areas()
                        .iter()
                        .map(|a| identity.template_area(a, FindingKind::Unexistent))
                        .collect(),
                );
                return Evaluation {
                    report: Some(report),
                    correspondence: Correspondence::default(),
                };
            }
            _ if expected != found => {
                trace_warn!("sample has {} areas, template has {}", found, expected);
                report.is_total_areas_correct = false;
                any_error = true;
            }
            _ => {}
        }

        let correspondence = correspond(template.areas(), &sample.areas);
        let rotation = correspondence.rotation();
        report.info.rotate_correction = rotation.corner_order();
        let frame = FindingFrame::new(template, sample.bbox(), rotation);

        let mut findings = Vec::new();
        for (idx, detected) in sample.areas.iter().enumerate() {
            match correspondence.assigned(idx).and_then(|id| template.area(id)) {
                Some(area) => {
                    if let Some(kind) = self.classify(detected, area, rotation) {
                        findings.push(frame.template_area(area, kind));
                    }
                }
                None => {
                    trace_warn!("detected area {} has no template counterpart", idx);
                    findings.push(frame.unexpected(detected));
                }
            }
        }
        for id in correspondence.missing(expected) {
            trace_warn!("template area {} not found in sample", id);
            if let Some(area) = template.area(id) {
                findings.push(frame.template_area(area, FindingKind::Unexistent));
            }
        }

        trace_event!(
            "comparison",
            findings = findings.len(),
            rotation_steps = rotation.steps(),
            any_error = any_error
        );
        let report = if findings.is_empty() && !any_error {
            None
        } else {
            report.areas = Some(findings);
            Some(report)
        };
        Evaluation {
            report,
            correspondence,
        }
    }

    /// Tolerance checks for one matched area.
    fn classify(
        &self,
        detected: &DetectedArea,
        area: &TemplateArea,
        rotation: Rotation,
    ) -> Option<FindingKind> {
        let k = self.config.sigma_multiplier;
        let stats = &area.stats;
        let center_ok = [Corner::TopLeft, Corner::TopRight].iter().all(|&label| {
            stats
                .stat(|m| m.distance_px[label])
                .contains(detected.distance_px_as(rotation, label), k)
        });
        let area_ok = stats
            .stat(|m| m.area_px)
            .contains(Decimal::from(detected.area_px), k);

        let kind = match (center_ok, area_ok) {
            (true, true) => return None,
            (false, true) => FindingKind::Center,
            (true, false) => FindingKind::Area,
            (false, false) => FindingKind::Both,
        };
        trace_warn!("area {} out of tolerance: {}", area.id, kind.as_str());
        Some(kind)
    }
}

/// Compares `sample` against `template` with the default configuration.
///
/// Returns the updated template and the report, `None` meaning the sample
/// matches within tolerance.
pub fn compare_sample(sample: &Sample, template: Template) -> (Template, Option<ErrorReport>) {
    let inspection = Comparator::default().compare(sample, template);
    (inspection.template, inspection.report)
}
