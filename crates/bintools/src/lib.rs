//! High-level facade for the `bintools-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the focused crates (grid model, thresholding,
//!   labeling, morphology, reporting),
//! - [`Binarizer`], which runs the whole threshold → label → clean →
//!   summarise pipeline from one serde-friendly [`BinarizeParams`],
//! - JSON config/report helpers in [`io`].
//!
//! ## Quickstart
//!
//! ```
//! use bintools::core::GridView;
//! use bintools::{BinarizeParams, Binarizer, ThresholdSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut data = vec![0u8; 25];
//! data[11..14].fill(1);
//! let grid = GridView::from_slice(&[5, 5], &data)?;
//!
//! let params = BinarizeParams {
//!     threshold: ThresholdSpec::Fixed { value: 1.0 },
//!     ..BinarizeParams::default()
//! };
//! let result = Binarizer::new(params).run(&grid)?;
//! assert_eq!(result.components.len(), 1);
//! assert_eq!(result.components[0].count, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `bintools::core`: shapes, grids, masks, label fields, logging.
//! - `bintools::threshold`: Otsu/percentile selection and mask application.
//! - `bintools::label`: connectivity, union-find, (tiled) component labeling.
//! - `bintools::morph`: small-component removal, hole filling, relabeling.
//! - `bintools::report`: component records, intensity stats, `binreduce`.
//!
//! ## Features
//! - `parallel`: label slabs on the `rayon` pool when `tiles > 1`.
//! - `tracing`: spans on every stage and `core::init_tracing`.

pub use bintools_core as core;
pub use bintools_label as label;
pub use bintools_morph as morph;
pub use bintools_report as report;
pub use bintools_threshold as threshold;

pub use bintools_core::{Grid, GridView, LabelField, Mask, Shape};
pub use bintools_label::{CancelFlag, Connectivity};
pub use bintools_report::{ComponentRecord, IntensityRecord};

pub mod io;
mod pipeline;

pub use pipeline::{BinarizeError, BinarizeParams, BinarizeResult, Binarizer, ThresholdSpec};
