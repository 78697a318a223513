//! Correspondence between detected areas and template areas.
//!
//! A piece can be placed in any of four quarter-turn orientations, so the
//! corner labels of a detected box are only meaningful up to a rotation.
//! [`correspond`] resolves that rotation together with the template id of
//! each detected area.

mod assign;
mod cost;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Corner;
use crate::sample::{DetectedArea, UNMATCHED_ID};

pub use assign::correspond;
pub use cost::{corner_cost, edge_cost};

/// Quarter-turn relation between a detected box and the template frame.
///
/// Under rotation `k`, the template's corner label `c` corresponds to the
/// detected corner `k` steps clockwise of `c`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rotation {
    #[default]
    Identity,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Candidates in the order they are tried; earlier ones win ties.
    pub const ALL: [Rotation; 4] = [
        Rotation::Identity,
        Rotation::Quarter,
        Rotation::Half,
        Rotation::ThreeQuarter,
    ];

    /// Number of clockwise label shifts.
    pub fn steps(self) -> usize {
        match self {
            Rotation::Identity => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarter => 3,
        }
    }

    pub fn from_steps(steps: usize) -> Rotation {
        Rotation::ALL[steps % 4]
    }

    /// Detected corner playing the template role `label`.
    pub fn detected_corner(self, label: Corner) -> Corner {
        label.clockwise(self.steps())
    }

    /// Detected corners listed in template label order
    /// (top-left, top-right, bottom-right, bottom-left).
    pub fn corner_order(self) -> [Corner; 4] {
        Corner::ALL.map(|label| self.detected_corner(label))
    }
}

/// Result of matching a sample's areas against a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Correspondence {
    rotation: Rotation,
    assignments: Vec<Option<usize>>,
}

impl Correspondence {
    /// Creates a correspondence; `assignments[i]` is the template id of
    /// detected area `i`.
    pub fn new(rotation: Rotation, assignments: Vec<Option<usize>>) -> Self {
        Self {
            rotation,
            assignments,
        }
    }

    /// Identity rotation, taking each area's own (provisional) id as given.
    /// Negative ids stay unmatched.
    pub fn provisional(areas: &[DetectedArea]) -> Self {
        Self::new(
            Rotation::Identity,
            areas.iter().map(|a| usize::try_from(a.id).ok()).collect(),
        )
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn corner_order(&self) -> [Corner; 4] {
        self.rotation.corner_order()
    }

    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    /// Template id assigned to detected area `index`.
    pub fn assigned(&self, index: usize) -> Option<usize> {
        self.assignments.get(index).copied().flatten()
    }

    /// Indices of detected areas without a template counterpart.
    pub fn unexpected(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| id.is_none().then_some(idx))
    }

    /// Template ids in `[0, total_areas)` claimed by no detected area.
    pub fn missing(&self, total_areas: usize) -> Vec<usize> {
        (0..total_areas)
            .filter(|id| !self.assignments.contains(&Some(*id)))
            .collect()
    }

    /// Writes the resolved ids into `areas`, using [`UNMATCHED_ID`] for
    /// unmatched ones.
    pub fn apply(&self, areas: &mut [DetectedArea]) {
        for (area, id) in areas.iter_mut().zip(&self.assignments) {
            area.id = id.map_or(UNMATCHED_ID, |id| id as i64);
        }
    }
}
