//! Running statistics over measurement fields.
//!
//! Every scalar field of a record carries the same four statistics (mean,
//! variance, standard deviation, standard error of the mean). [`Stats`]
//! stores them as four parallel records of the measured shape so that stored
//! templates keep a `mean`/`variance`/`stdev`/`error` layout; [`Measures`]
//! exposes the scalar fields of such a record in a fixed order so that
//! [`accumulate`] can be applied to each of them uniformly.

mod accumulate;

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{CornerMap, DecimalPoint};

pub use accumulate::accumulate;

/// The four statistics of one scalar field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stat {
    pub mean: Decimal,
    pub variance: Decimal,
    pub stdev: Decimal,
    /// Standard error of the mean.
    pub error: Decimal,
}

impl Stat {
    /// Returns `(mean - k*stdev, mean + k*stdev)`.
    pub fn band(&self, k: Decimal) -> (Decimal, Decimal) {
        let half = self.stdev * k;
        (self.mean - half, self.mean + half)
    }

    /// True if `x` lies in the closed `k`-sigma band.
    pub fn contains(&self, x: Decimal, k: Decimal) -> bool {
        let (lower, upper) = self.band(k);
        x >= lower && x <= upper
    }
}

/// A record of scalar measurement fields.
pub trait Measures: Clone + Default {
    /// Field values in a fixed order.
    fn values(&self) -> Vec<Decimal>;
    /// Mutable field references in the same order as [`Measures::values`].
    fn values_mut(&mut self) -> Vec<&mut Decimal>;
}

/// Mean, variance, stdev and error of every field of `M`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stats<M> {
    pub mean: M,
    pub variance: M,
    pub stdev: M,
    pub error: M,
}

impl<M: Measures> Stats<M> {
    /// Folds one observation into every field; `count` includes it.
    pub fn fold(&mut self, count: u64, observation: &M) {
        let Stats {
            mean,
            variance,
            stdev,
            error,
        } = self;
        let fields = mean
            .values_mut()
            .into_iter()
            .zip(variance.values_mut())
            .zip(stdev.values_mut())
            .zip(error.values_mut())
            .zip(observation.values());
        for ((((mean, variance), stdev), error), x) in fields {
            let prev = Stat {
                mean: *mean,
                variance: *variance,
                stdev: *stdev,
                error: *error,
            };
            let next = accumulate(prev, count, x);
            *mean = next.mean;
            *variance = next.variance;
            *stdev = next.stdev;
            *error = next.error;
        }
    }

    /// Collects the four statistics of the field selected by `field`.
    pub fn stat(&self, field: impl Fn(&M) -> Decimal) -> Stat {
        Stat {
            mean: field(&self.mean),
            variance: field(&self.variance),
            stdev: field(&self.stdev),
            error: field(&self.error),
        }
    }
}

/// Box fields tracked by a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxMeasures {
    pub area_mm: Decimal,
    pub area_px: Decimal,
    pub delta_mm: DecimalPoint,
    pub delta_px: DecimalPoint,
}

impl Measures for BoxMeasures {
    fn values(&self) -> Vec<Decimal> {
        vec![
            self.area_px,
            self.area_mm,
            self.delta_px.x,
            self.delta_px.y,
            self.delta_mm.x,
            self.delta_mm.y,
        ]
    }

    fn values_mut(&mut self) -> Vec<&mut Decimal> {
        vec![
            &mut self.area_px,
            &mut self.area_mm,
            &mut self.delta_px.x,
            &mut self.delta_px.y,
            &mut self.delta_mm.x,
            &mut self.delta_mm.y,
        ]
    }
}

/// Per-area fields tracked by a template, in the template's corner frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AreaMeasures {
    pub area_mm: Decimal,
    pub area_px: Decimal,
    pub distance_px: CornerMap<Decimal>,
    pub distance_mm: CornerMap<Decimal>,
}

impl Measures for AreaMeasures {
    fn values(&self) -> Vec<Decimal> {
        let mut out = vec![self.area_px, self.area_mm];
        out.extend(self.distance_px.iter().copied());
        out.extend(self.distance_mm.iter().copied());
        out
    }

    fn values_mut(&mut self) -> Vec<&mut Decimal> {
        let mut out = vec![&mut self.area_px, &mut self.area_mm];
        out.extend(self.distance_px.values_mut());
        out.extend(self.distance_mm.values_mut());
        out
    }
}
