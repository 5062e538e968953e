//! Measurements over a [`LabelField`](bintools_core::LabelField).
//!
//! - [`summarize`]: cell count, bounding box, centroid and exposed faces of
//!   every component, in ascending label order.
//! - [`binreduce`]: min/max reduction of weights into integer bins, the
//!   primitive behind [`summarize_intensity`].

mod binreduce;
mod intensity;
mod summary;

pub use binreduce::{binreduce, BinReduceError, ReduceOp};
pub use intensity::{summarize_intensity, IntensityRecord, ReportError};
pub use summary::{summarize, BoundingBox, ComponentRecord};
