//! Threshold selection and binarization.
//!
//! Two steps, kept separate so callers can substitute their own cutoff:
//! - [`compute_global_threshold`] picks one scalar cutoff from the value
//!   distribution of a grid ([`ThresholdMethod::Otsu`] or
//!   [`ThresholdMethod::Percentile`]),
//! - [`apply_threshold`] turns a grid into a [`Mask`](bintools_core::Mask)
//!   using a comparison [`Direction`].

mod apply;
mod histogram;
mod method;

pub use apply::{apply_threshold, Direction};
pub use histogram::{Histogram, MAX_BINS};
pub use method::{compute_global_threshold, ThresholdError, ThresholdMethod};
