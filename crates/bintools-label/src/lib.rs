//! Connected-component labeling of binary masks.
//!
//! Algorithm (two-pass, union-find):
//! 1. Scan foreground cells in raster order. A cell with no labelled
//!    backward neighbour opens a provisional label; otherwise it takes the
//!    smallest neighbouring label and all neighbouring labels are unioned.
//! 2. Resolve every provisional label to its set root and renumber densely
//!    from 1 in order of first appearance in raster order.
//!
//! With [`Labeler::with_tiles`] the grid is cut into slabs along its
//! outermost axis. Slabs run step 1 independently (on the `rayon` pool with
//! the `parallel` feature); once every slab is done, labels touching across
//! slab seams are unioned and step 2 runs once over the whole field, so the
//! output is identical to the single-slab pass.
//!
//! ```
//! use bintools_core::{Mask, Shape};
//! use bintools_label::{label, Connectivity};
//!
//! let shape = Shape::new_2d(2, 2).unwrap();
//! let mask = Mask::new(shape, vec![true, false, false, true]).unwrap();
//! assert_eq!(label(&mask, Connectivity::Four).unwrap().max_label(), 2);
//! assert_eq!(label(&mask, Connectivity::Eight).unwrap().max_label(), 1);
//! ```

mod cancel;
mod connectivity;
mod labeler;
mod union_find;

pub use cancel::CancelFlag;
pub use connectivity::{Connectivity, ConnectivityError};
pub use labeler::{label, LabelError, Labeler};
pub use union_find::DisjointSet;
