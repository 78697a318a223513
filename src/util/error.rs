//! Error types for piece-inspect.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias for piece-inspect operations.
pub type InspectResult<T> = std::result::Result<T, InspectError>;

/// Errors that can occur while training or loading templates.
///
/// Tolerance violations found during comparison are never reported through
/// this type; they are returned as an [`ErrorReport`](crate::ErrorReport).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InspectError {
    /// A training sample carries a different number of areas than the
    /// template started with.
    #[error("sample {sample}: found {found} areas, template expects {expected}")]
    AreaCountMismatch {
        sample: usize,
        expected: usize,
        found: usize,
    },
    /// A training sample carries different calibration constants.
    #[error("sample {sample}: {constant} is {found}, template expects {expected}")]
    CalibrationMismatch {
        sample: usize,
        constant: &'static str,
        expected: Decimal,
        found: Decimal,
    },
    /// A training run was given the wrong number of samples.
    #[error("training requires exactly {expected} samples, got {found}")]
    TrainingSetSize { expected: usize, found: usize },
    /// An area id is outside `[0, total_areas)`.
    #[error("area id {id} is out of range for {total_areas} areas")]
    InvalidAreaId { id: i64, total_areas: usize },
    /// Two areas of one record share an id.
    #[error("area id {id} appears more than once")]
    DuplicateAreaId { id: i64 },
    /// A stored template violates its structural invariants.
    #[error("invalid template: {0}")]
    InvalidTemplate(&'static str),
}
