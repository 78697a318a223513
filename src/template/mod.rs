//! Statistical template of a piece design.
//!
//! A [`Template`] is built by folding training samples one at a time (see
//! [`train`]) and keeps refining as matching samples are inspected. It holds
//! running statistics over the enclosing box and, per stable area id, over
//! the area size and its four corner distances, plus per-area failure
//! counters.

pub mod train;

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::correspond::Correspondence;
use crate::inspect::{ErrorReport, FindingKind};
use crate::sample::{Calibration, Sample};
use crate::stats::{AreaMeasures, BoxMeasures, Stats};
use crate::trace::trace_event;
use crate::util::{InspectError, InspectResult};

pub use train::{train_fold, TrainConfig, TrainingRun};

/// Number of times an area failed inspection, by failure kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FailureCounters {
    pub area: u64,
    pub center: u64,
    pub both: u64,
    pub unexistent: u64,
}

impl FailureCounters {
    /// Counts one failure of `kind`; `Unexpected` has no counter.
    pub fn record(&mut self, kind: FindingKind) {
        match kind {
            FindingKind::Area => self.area += 1,
            FindingKind::Center => self.center += 1,
            FindingKind::Both => self.both += 1,
            FindingKind::Unexistent => self.unexistent += 1,
            FindingKind::Unexpected => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.area + self.center + self.both + self.unexistent
    }
}

/// Global template record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateInfo {
    pub stats: Stats<BoxMeasures>,
    pub total_areas: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub calibration: Calibration,
    pub sample_size: u64,
}

/// Statistics of one stable area id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateArea {
    pub id: usize,
    pub failed: FailureCounters,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub stats: Stats<AreaMeasures>,
}

impl TemplateArea {
    /// Zeroed statistics for `id`.
    pub fn empty(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Trained reference for one piece design.
///
/// Areas are kept sorted with `areas[i].id == i` for every `i` in
/// `[0, total_areas)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TemplateParts"))]
pub struct Template {
    info: TemplateInfo,
    areas: Vec<TemplateArea>,
}

impl Template {
    /// Creates an empty template with all statistics zeroed.
    pub fn new(calibration: Calibration, total_areas: usize) -> Self {
        Self {
            info: TemplateInfo {
                stats: Stats::default(),
                total_areas,
                calibration,
                sample_size: 0,
            },
            areas: (0..total_areas).map(TemplateArea::empty).collect(),
        }
    }

    /// Rebuilds a template from stored parts, sorting areas by id.
    ///
    /// Fails if the area ids are not exactly `0..total_areas`.
    pub fn from_parts(
        info: TemplateInfo,
        mut areas: Vec<TemplateArea>,
    ) -> InspectResult<Self> {
        if areas.len() != info.total_areas {
            return Err(InspectError::InvalidTemplate(
                "area count does not match total_areas",
            ));
        }
        areas.sort_by_key(|area| area.id);
        if areas.iter().enumerate().any(|(idx, area)| area.id != idx) {
            return Err(InspectError::InvalidTemplate(
                "area ids must cover 0..total_areas exactly once",
            ));
        }
        Ok(Self { info, areas })
    }

    pub fn info(&self) -> &TemplateInfo {
        &self.info
    }

    pub fn areas(&self) -> &[TemplateArea] {
        &self.areas
    }

    pub fn area(&self, id: usize) -> Option<&TemplateArea> {
        self.areas.get(id)
    }

    pub fn total_areas(&self) -> usize {
        self.info.total_areas
    }

    pub fn sample_size(&self) -> u64 {
        self.info.sample_size
    }

    pub fn calibration(&self) -> &Calibration {
        &self.info.calibration
    }

    /// Mean box area in pixels.
    pub fn mean_box_area_px(&self) -> Decimal {
        self.info.stats.mean.area_px
    }

    /// Folds one corresponded sample into the statistics.
    ///
    /// Box statistics are always updated; area statistics only for detected
    /// areas that `correspondence` assigns to a template id. Every area uses
    /// the template's overall sample count. No consistency checks are made
    /// here; see [`train_fold`] for the checked variant.
    pub fn fold(mut self, sample: &Sample, correspondence: &Correspondence) -> Self {
        self.info.sample_size += 1;
        let count = self.info.sample_size;
        self.info.stats.fold(count, &sample.bbox().measures());

        let rotation = correspondence.rotation();
        for (idx, detected) in sample.areas.iter().enumerate() {
            let Some(id) = correspondence.assigned(idx) else {
                continue;
            };
            if let Some(area) = self.areas.get_mut(id) {
                area.stats.fold(count, &detected.measures(rotation));
            }
        }
        trace_event!("template_fold", sample_size = count);
        self
    }

    /// Increments the failure counter of every template area named in
    /// `report`.
    pub fn record_failures(&mut self, report: &ErrorReport) {
        for finding in report.findings() {
            let Ok(id) = usize::try_from(finding.id) else {
                continue;
            };
            if let Some(area) = self.areas.get_mut(id) {
                area.failed.record(finding.kind);
            }
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TemplateParts {
    info: TemplateInfo,
    areas: Vec<TemplateArea>,
}

#[cfg(feature = "serde")]
impl TryFrom<TemplateParts> for Template {
    type Error = InspectError;

    fn try_from(parts: TemplateParts) -> InspectResult<Self> {
        Template::from_parts(parts.info, parts.areas)
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureCounters, Template, TemplateArea, TemplateInfo};
    use crate::inspect::FindingKind;
    use crate::sample::Calibration;
    use crate::util::InspectError;

    #[test]
    fn new_template_has_sorted_empty_areas() {
        let tpl = Template::new(Calibration::default(), 3);
        assert_eq!(tpl.total_areas(), 3);
        assert_eq!(tpl.sample_size(), 0);
        let ids: Vec<usize> = tpl.areas().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn from_parts_sorts_and_validates() {
        let info = TemplateInfo {
            total_areas: 2,
            ..TemplateInfo::default()
        };
        let tpl = Template::from_parts(
            info.clone(),
            vec![TemplateArea::empty(1), TemplateArea::empty(0)],
        )
        .unwrap();
        assert_eq!(tpl.areas()[0].id, 0);

        let err = Template::from_parts(
            info.clone(),
            vec![TemplateArea::empty(0), TemplateArea::empty(0)],
        )
        .unwrap_err();
        assert!(matches!(err, InspectError::InvalidTemplate(_)));

        let err = Template::from_parts(info, vec![TemplateArea::empty(0)]).unwrap_err();
        assert!(matches!(err, InspectError::InvalidTemplate(_)));
    }

    #[test]
    fn unexpected_findings_have_no_counter() {
        let mut counters = FailureCounters::default();
        counters.record(FindingKind::Both);
        counters.record(FindingKind::Unexpected);
        counters.record(FindingKind::Unexistent);
        assert_eq!(counters.both, 1);
        assert_eq!(counters.unexistent, 1);
        assert_eq!(counters.total(), 2);
    }
}
