//! Cleanup passes over a [`LabelField`](bintools_core::LabelField).
//!
//! Every pass returns a new field. Label identity is predictable:
//! - [`remove_small_components`] zeroes undersized components and leaves
//!   the surviving ids untouched,
//! - [`relabel_sequential`] is the explicit follow-up that closes the gaps,
//! - [`fill_holes`] hands enclosed background pockets to the single
//!   component surrounding them.

mod holes;
mod small;

pub use holes::{fill_holes, MorphError};
pub use small::{relabel_sequential, remove_small_components};
