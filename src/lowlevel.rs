//! Low-level building blocks for custom inspection pipelines.
//!
//! These expose the geometric reconstruction, the running statistics and the
//! correspondence cost functions used internally by [`Comparator`] and the
//! trainer, e.g. for drawing findings onto an image. Most users should prefer
//! the top-level `TrainingRun` and `Comparator` types.
//!
//! [`Comparator`]: crate::Comparator

pub use crate::correspond::{corner_cost, edge_cost};
pub use crate::geometry::{map_to_image_frame, pixel_distance, reconstruct_offset};
pub use crate::stats::{accumulate, AreaMeasures, BoxMeasures, Measures, Stat, Stats};
