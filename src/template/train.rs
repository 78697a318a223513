//! Template training from repeated measurements of one piece.
//!
//! Training folds samples one at a time. The first sample fixes the area
//! count and calibration constants; every later sample must match them
//! exactly or the run is aborted with an error naming the sample.

use crate::correspond::{correspond, Correspondence};
use crate::sample::{Calibration, Sample};
use crate::template::Template;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{InspectError, InspectResult};

/// Number of samples in a training run unless configured otherwise.
pub const DEFAULT_TRAINING_SAMPLES: usize = 10;

/// Training configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainConfig {
    /// Exact number of samples a [`TrainingRun`] must fold.
    pub required_samples: usize,
    /// Calibration every sample must carry, including the first.
    pub calibration: Option<Calibration>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            required_samples: DEFAULT_TRAINING_SAMPLES,
            calibration: None,
        }
    }
}

/// Folds one training sample into `template`, creating it if absent.
///
/// A fresh template takes its area count and calibration from `sample`, whose
/// ids must then be distinct and lie in `[0, areas)`. An existing template is
/// matched against the sample first; any area-count or calibration mismatch
/// is fatal. Errors report the sample's position in the run, which equals
/// the number of samples already folded.
pub fn train_fold(sample: &Sample, template: Option<Template>) -> InspectResult<Template> {
    match template {
        None => start_template(sample),
        Some(template) => {
            check_compatible(&template, sample)?;
            Ok(extend_template(template, sample))
        }
    }
}

fn start_template(sample: &Sample) -> InspectResult<Template> {
    let _guard = trace_span!("train_fold", sample = 0usize).entered();
    let total_areas = sample.total_areas();
    let mut seen = vec![false; total_areas];
    for area in &sample.areas {
        let idx = usize::try_from(area.id)
            .ok()
            .filter(|idx| *idx < total_areas)
            .ok_or(InspectError::InvalidAreaId {
                id: area.id,
                total_areas,
            })?;
        if std::mem::replace(&mut seen[idx], true) {
            return Err(InspectError::DuplicateAreaId { id: area.id });
        }
    }

    let template = Template::new(*sample.calibration(), total_areas);
    let correspondence = Correspondence::provisional(&sample.areas);
    trace_event!("template_created", total_areas = total_areas);
    Ok(template.fold(sample, &correspondence))
}

fn extend_template(template: Template, sample: &Sample) -> Template {
    let _guard = trace_span!("train_fold", sample = template.sample_size()).entered();
    let correspondence = correspond(template.areas(), &sample.areas);
    template.fold(sample, &correspondence)
}

fn check_compatible(template: &Template, sample: &Sample) -> InspectResult<()> {
    let index = template.sample_size() as usize;
    if template.total_areas() != sample.total_areas() {
        trace_warn!(
            "training sample {} has {} areas, template has {}",
            index,
            sample.total_areas(),
            template.total_areas()
        );
        return Err(InspectError::AreaCountMismatch {
            sample: index,
            expected: template.total_areas(),
            found: sample.total_areas(),
        });
    }
    check_calibration(template.calibration(), sample.calibration(), index)
}

fn check_calibration(
    expected: &Calibration,
    found: &Calibration,
    sample: usize,
) -> InspectResult<()> {
    if expected.mm_to_px != found.mm_to_px {
        trace_warn!("training sample {} has a different mm_to_px", sample);
        return Err(InspectError::CalibrationMismatch {
            sample,
            constant: "mm_to_px",
            expected: expected.mm_to_px,
            found: found.mm_to_px,
        });
    }
    if expected.mm_to_px_squared != found.mm_to_px_squared {
        trace_warn!("training sample {} has a different mm_to_px_squared", sample);
        return Err(InspectError::CalibrationMismatch {
            sample,
            constant: "mm_to_px_squared",
            expected: expected.mm_to_px_squared,
            found: found.mm_to_px_squared,
        });
    }
    Ok(())
}

/// A training run over a fixed number of samples of one piece.
///
/// ```
/// use piece_inspect::{Sample, TrainConfig, TrainingRun};
///
/// let config = TrainConfig { required_samples: 2, ..TrainConfig::default() };
/// let mut run = TrainingRun::new(config);
/// run.push(&Sample::default()).unwrap();
/// run.push(&Sample::default()).unwrap();
/// let template = run.finish().unwrap();
/// assert_eq!(template.sample_size(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct TrainingRun {
    config: TrainConfig,
    template: Option<Template>,
    /// First fatal error; once set the run accepts nothing more.
    failed: Option<InspectError>,
}

impl TrainingRun {
    pub fn new(config: TrainConfig) -> Self {
        Self {
            config,
            template: None,
            failed: None,
        }
    }

    /// Trains a template from exactly `config.required_samples` samples.
    pub fn train<'a>(
        config: TrainConfig,
        samples: impl IntoIterator<Item = &'a Sample>,
    ) -> InspectResult<Template> {
        let mut run = Self::new(config);
        for sample in samples {
            run.push(sample)?;
        }
        run.finish()
    }

    /// Number of samples folded so far.
    pub fn folded(&self) -> usize {
        self.template
            .as_ref()
            .map_or(0, |template| template.sample_size() as usize)
    }

    /// The template built so far; `None` once the run has failed.
    pub fn template(&self) -> Option<&Template> {
        match self.failed {
            Some(_) => None,
            None => self.template.as_ref(),
        }
    }

    /// The fatal error that ended the run, if any.
    pub fn failure(&self) -> Option<&InspectError> {
        self.failed.as_ref()
    }

    /// Folds the next sample of the run.
    ///
    /// An invalid or incompatible sample aborts the run: the partial template
    /// is discarded and every later `push` or `finish` returns the same error.
    /// Pushing past `required_samples` is rejected without aborting.
    pub fn push(&mut self, sample: &Sample) -> InspectResult<()> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let index = self.folded();
        if index >= self.config.required_samples {
            return Err(InspectError::TrainingSetSize {
                expected: self.config.required_samples,
                found: index + 1,
            });
        }
        match self.fold_next(sample, index) {
            Ok(next) => {
                self.template = Some(next);
                Ok(())
            }
            Err(err) => {
                trace_warn!("training run aborted at sample {}: {}", index, err);
                self.template = None;
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    fn fold_next(&mut self, sample: &Sample, index: usize) -> InspectResult<Template> {
        if let Some(expected) = &self.config.calibration {
            check_calibration(expected, sample.calibration(), index)?;
        }
        match self.template.take() {
            None => start_template(sample),
            Some(template) => {
                check_compatible(&template, sample)?;
                Ok(extend_template(template, sample))
            }
        }
    }

    /// Ends the run, requiring exactly `config.required_samples` folds.
    pub fn finish(self) -> InspectResult<Template> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        let found = self.folded();
        match self.template {
            Some(template) if found == self.config.required_samples => Ok(template),
            _ => Err(InspectError::TrainingSetSize {
                expected: self.config.required_samples,
                found,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{train_fold, TrainConfig, TrainingRun};
    use crate::geometry::CornerMap;
    use crate::sample::{Calibration, DetectedArea, Sample};
    use crate::util::InspectError;
    use rust_decimal::Decimal;

    fn sample_with(ids: &[i64]) -> Sample {
        let calibration = Calibration::new(Decimal::new(2, 1), Decimal::new(4, 2));
        let areas = ids
            .iter()
            .map(|&id| {
                DetectedArea::new(
                    id,
                    100,
                    CornerMap::from_fn(|c| Decimal::from(50 + 10 * c.index() as i64)),
                    &calibration,
                )
            })
            .collect();
        Sample::new(Default::default(), calibration, areas)
    }

    #[test]
    fn first_fold_rejects_out_of_range_ids() {
        let err = train_fold(&sample_with(&[0, 5]), None).unwrap_err();
        assert_eq!(
            err,
            InspectError::InvalidAreaId {
                id: 5,
                total_areas: 2
            }
        );
        let err = train_fold(&sample_with(&[1, 1]), None).unwrap_err();
        assert_eq!(err, InspectError::DuplicateAreaId { id: 1 });
    }

    #[test]
    fn count_mismatch_names_the_sample() {
        let tpl = train_fold(&sample_with(&[0, 1]), None).unwrap();
        let tpl = train_fold(&sample_with(&[0, 1]), Some(tpl)).unwrap();
        let err = train_fold(&sample_with(&[0]), Some(tpl)).unwrap_err();
        assert_eq!(
            err,
            InspectError::AreaCountMismatch {
                sample: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn run_enforces_exact_sample_count() {
        let config = TrainConfig {
            required_samples: 2,
            ..TrainConfig::default()
        };
        let mut run = TrainingRun::new(config);
        run.push(&sample_with(&[0])).unwrap();
        let err = run.clone().finish().unwrap_err();
        assert_eq!(
            err,
            InspectError::TrainingSetSize {
                expected: 2,
                found: 1
            }
        );
        run.push(&sample_with(&[0])).unwrap();
        let err = run.push(&sample_with(&[0])).unwrap_err();
        assert_eq!(
            err,
            InspectError::TrainingSetSize {
                expected: 2,
                found: 3
            }
        );
        assert_eq!(run.finish().unwrap().sample_size(), 2);
    }

    #[test]
    fn configured_calibration_applies_to_first_sample() {
        let config = TrainConfig {
            required_samples: 1,
            calibration: Some(Calibration::new(Decimal::ONE, Decimal::ONE)),
        };
        let mut run = TrainingRun::new(config);
        let err = run.push(&sample_with(&[0])).unwrap_err();
        assert!(matches!(
            err,
            InspectError::CalibrationMismatch {
                sample: 0,
                constant: "mm_to_px",
                ..
            }
        ));
        assert!(run.template().is_none());
    }

    #[test]
    fn mismatch_aborts_the_run() {
        let config = TrainConfig {
            required_samples: 3,
            ..TrainConfig::default()
        };
        let mut run = TrainingRun::new(config);
        run.push(&sample_with(&[0, 1])).unwrap();
        let err = run.push(&sample_with(&[0])).unwrap_err();
        let expected = InspectError::AreaCountMismatch {
            sample: 1,
            expected: 2,
            found: 1,
        };
        assert_eq!(err, expected);
        assert!(run.template().is_none());
        assert_eq!(run.failure(), Some(&expected));

        assert_eq!(run.push(&sample_with(&[0, 1])).unwrap_err(), expected);
        assert_eq!(run.push(&sample_with(&[0, 1])).unwrap_err(), expected);
        assert_eq!(run.finish().unwrap_err(), expected);
    }
}
