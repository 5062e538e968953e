//! Core data model for the `bintools` segmentation workspace.
//!
//! This crate owns the containers every other stage works on:
//! - [`Shape`]: immutable extents of a 2D or 3D row-major grid,
//! - [`Grid`] / [`GridView`]: dense samples of one [`Sample`] kind,
//! - [`Mask`]: the binarized foreground,
//! - [`LabelField`]: connected-component ids, `0` being background.
//!
//! It deliberately knows nothing about thresholds or connectivity.

mod field;
mod grid;
mod logger;
mod sample;
mod shape;

pub use field::{Label, LabelField, Mask};
pub use grid::{Grid, GridView};
pub use sample::{Sample, SampleKind};
pub use shape::{GridError, Shape};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_logging, LogConfig, LogLevel, Stage};
