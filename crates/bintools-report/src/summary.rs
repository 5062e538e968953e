use std::collections::BTreeMap;

use bintools_core::{Label, LabelField};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inclusive per-axis extent of a component, outermost axis first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec<usize>,
    pub max: Vec<usize>,
}

impl BoundingBox {
    /// Cells spanned along each axis.
    pub fn size(&self) -> Vec<usize> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| hi - lo + 1)
            .collect()
    }
}

/// Aggregate measurements of one labelled component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub label: Label,
    /// Member cells (pixels or voxels).
    pub count: usize,
    pub bbox: BoundingBox,
    /// Mean member coordinate per axis.
    pub centroid: Vec<f64>,
    /// Cell faces shared with another id or with the field border.
    pub surface_faces: usize,
}

struct Accumulator {
    count: usize,
    min: [usize; 3],
    max: [usize; 3],
    sum: [f64; 3],
    faces: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            min: [usize::MAX; 3],
            max: [0; 3],
            sum: [0.0; 3],
            faces: 0,
        }
    }
}

/// One record per non-empty label, ascending by id.
///
/// An all-background field yields an empty vector.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(labels), fields(len = labels.len()))
)]
pub fn summarize(labels: &LabelField) -> Vec<ComponentRecord> {
    let shape = labels.shape();
    let dims = shape.volume_dims();
    let ids = labels.as_slice();
    let strides = [dims[1] * dims[2], dims[2], 1];
    let axes = 3 - shape.ndim()..3;

    let mut acc: BTreeMap<Label, Accumulator> = BTreeMap::new();

    for (offset, &l) in ids.iter().enumerate() {
        if l == 0 {
            continue;
        }
        let at = shape.volume_coords(offset);
        let a = acc.entry(l).or_default();
        a.count += 1;
        for axis in 0..3 {
            a.min[axis] = a.min[axis].min(at[axis]);
            a.max[axis] = a.max[axis].max(at[axis]);
            a.sum[axis] += at[axis] as f64;
        }
        for axis in axes.clone() {
            if at[axis] == 0 || ids[offset - strides[axis]] != l {
                a.faces += 1;
            }
            if at[axis] + 1 == dims[axis] || ids[offset + strides[axis]] != l {
                a.faces += 1;
            }
        }
    }

    debug!("summarised {} components over {} cells", acc.len(), ids.len());
    acc.into_iter()
        .map(|(label, a)| {
            let n = a.count as f64;
            ComponentRecord {
                label,
                count: a.count,
                bbox: BoundingBox {
                    min: shape.to_axes(a.min),
                    max: shape.to_axes(a.max),
                },
                centroid: shape.to_axes(a.sum.map(|s| s / n)),
                surface_faces: a.faces,
            }
        })
        .collect()
}
