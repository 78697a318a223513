//! Piece-inspect is a statistical quality-control engine for flat pieces.
//!
//! A [`Template`] is trained from a fixed number of measured [`Sample`]s of a
//! reference piece: running statistics over the enclosing box and, for every
//! feature area, over its size and its distances to the four box corners.
//! Later samples are matched against the template under all four quarter-turn
//! orientations ([`correspond()`]) and compared within a sigma band
//! ([`Comparator`]), producing an [`ErrorReport`] of defective areas.
//!
//! Decimal arithmetic uses [`rust_decimal`]; enable the `serde` feature for
//! record (de)serialization and `tracing` for structured logs.

pub mod correspond;
pub mod geometry;
pub mod inspect;
pub mod lowlevel;
pub mod sample;
pub mod stats;
pub mod template;
mod trace;
pub mod util;

pub use rust_decimal::Decimal;

pub use correspond::{correspond, Correspondence, Rotation};
pub use geometry::{Corner, CornerMap, DecimalPoint, Offset, PixelPoint};
pub use inspect::{
    compare_sample, BoxAreaCheck, BoxFinding, Comparator, CompareConfig, ErrorReport, Evaluation,
    Finding, FindingKind, Inspection, ReportInfo,
};
pub use sample::{
    BoxInfo, Calibration, CalibrationCheck, DetectedArea, Sample, SampleBuilder, SampleInfo,
    UNMATCHED_ID,
};
pub use template::{
    train_fold, FailureCounters, Template, TemplateArea, TemplateInfo, TrainConfig, TrainingRun,
};
pub use util::{InspectError, InspectResult};
