use std::ops::Range;

use bintools_core::{Label, LabelField, Mask, Shape};
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{CancelFlag, Connectivity, ConnectivityError, DisjointSet};

/// Errors returned by labeling.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
    #[error("labeling cancelled")]
    Cancelled,
    #[error("provisional labels exceed the u32 label space")]
    TooManyComponents,
}

/// Label `mask` in one sequential pass.
pub fn label(mask: &Mask, connectivity: Connectivity) -> Result<LabelField, LabelError> {
    Labeler::new(connectivity).label(mask)
}

/// Configured connected-component labeler.
#[derive(Clone, Debug)]
pub struct Labeler {
    connectivity: Connectivity,
    tiles: usize,
    cancel: Option<CancelFlag>,
}

impl Labeler {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            tiles: 1,
            cancel: None,
        }
    }

    /// Split the grid into `tiles` slabs along its outermost axis.
    pub fn with_tiles(mut self, tiles: usize) -> Self {
        self.tiles = tiles.max(1);
        self
    }

    /// Poll `flag` between raster rows.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[inline]
    pub fn tiles(&self) -> usize {
        self.tiles
    }

    /// Label the foreground of `mask`.
    ///
    /// Background cells get 0; components are numbered densely from 1 in
    /// order of their first cell in raster order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask), fields(len = mask.len(), tiles = self.tiles))
    )]
    pub fn label(&self, mask: &Mask) -> Result<LabelField, LabelError> {
        let shape = mask.shape();
        self.connectivity.check_rank(shape.ndim())?;

        let mut field = LabelField::zeros(shape);
        if shape.is_empty() {
            return Ok(field);
        }

        let geom = Geometry::new(shape, self.connectivity);
        let slabs = geom.slabs(self.tiles);
        let cancel = self.cancel.as_ref();
        let data = mask.as_slice();

        #[cfg(feature = "parallel")]
        let blocks: Vec<Result<Block, LabelError>> = slabs
            .par_iter()
            .map(|r| scan_block(data, &geom, r.clone(), cancel))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let blocks: Vec<Result<Block, LabelError>> = slabs
            .iter()
            .map(|r| scan_block(data, &geom, r.clone(), cancel))
            .collect();
        let blocks = blocks.into_iter().collect::<Result<Vec<_>, _>>()?;

        let labels = field.as_mut_slice();
        let mut sets = merge_blocks(&blocks, labels)?;
        for block in blocks.iter().skip(1) {
            check_cancel(cancel)?;
            stitch_seam(&geom, block.range.start, labels, &mut sets);
        }
        let count = renumber(&geom, labels, &mut sets, cancel)?;

        debug!(
            "labelled {count} components ({} provisional, {} slabs, {:?})",
            sets.len(),
            blocks.len(),
            self.connectivity
        );
        Ok(field)
    }
}

/// Volume layout plus the backward half of the neighbourhood.
struct Geometry {
    dims: [usize; 3],
    /// Cells per slab unit: a row in 2D, a plane in 3D.
    unit: usize,
    backward: Vec<[isize; 3]>,
}

impl Geometry {
    fn new(shape: Shape, connectivity: Connectivity) -> Self {
        let dims = shape.volume_dims();
        let unit = if shape.ndim() == 2 {
            dims[2]
        } else {
            dims[1] * dims[2]
        };
        Self {
            dims,
            unit,
            backward: connectivity.backward_offsets(),
        }
    }

    #[inline]
    fn cols(&self) -> usize {
        self.dims[2]
    }

    #[inline]
    fn coords(&self, offset: usize) -> [usize; 3] {
        let plane = self.dims[1] * self.dims[2];
        [offset / plane, (offset % plane) / self.dims[2], offset % self.dims[2]]
    }

    /// Linear offset of `at + delta`, `None` outside the grid.
    #[inline]
    fn neighbor(&self, at: [usize; 3], delta: [isize; 3]) -> Option<usize> {
        let mut c = [0usize; 3];
        for axis in 0..3 {
            let v = at[axis].checked_add_signed(delta[axis])?;
            if v >= self.dims[axis] {
                return None;
            }
            c[axis] = v;
        }
        Some((c[0] * self.dims[1] + c[1]) * self.dims[2] + c[2])
    }

    /// Contiguous offset ranges of at most `tiles` slabs of whole units.
    fn slabs(&self, tiles: usize) -> Vec<Range<usize>> {
        let len = self.dims.iter().product::<usize>();
        let units = len / self.unit;
        let per_slab = units.div_ceil(tiles.max(1)).max(1);
        (0..units)
            .step_by(per_slab)
            .map(|u| u * self.unit..((u + per_slab).min(units)) * self.unit)
            .collect()
    }
}

/// Provisional labels of one slab, flattened to slab-local roots.
struct Block {
    range: Range<usize>,
    labels: Vec<Label>,
    count: usize,
}

fn check_cancel(cancel: Option<&CancelFlag>) -> Result<(), LabelError> {
    match cancel {
        Some(flag) if flag.is_cancelled() => Err(LabelError::Cancelled),
        _ => Ok(()),
    }
}

fn scan_block(
    mask: &[bool],
    geom: &Geometry,
    range: Range<usize>,
    cancel: Option<&CancelFlag>,
) -> Result<Block, LabelError> {
    let start = range.start;
    let mut labels = vec![0 as Label; range.len()];
    let mut sets = DisjointSet::new();

    for offset in range.clone() {
        if offset % geom.cols() == 0 {
            check_cancel(cancel)?;
        }
        if !mask[offset] {
            continue;
        }
        let at = geom.coords(offset);
        let mut current: Label = 0;
        for &delta in &geom.backward {
            let Some(nb) = geom.neighbor(at, delta) else {
                continue;
            };
            if nb < start {
                continue;
            }
            let l = labels[nb - start];
            if l == 0 {
                continue;
            }
            current = if current == 0 {
                sets.find(l)
            } else {
                sets.union(current, l)
            };
        }
        if current == 0 {
            current = sets.make_set().ok_or(LabelError::TooManyComponents)?;
        }
        labels[offset - start] = current;
    }

    for l in labels.iter_mut().filter(|l| **l != 0) {
        *l = sets.find(*l);
    }
    Ok(Block {
        range,
        labels,
        count: sets.len(),
    })
}

/// Write slab labels into `out` with per-slab id bases; returns the set
/// structure over all provisional ids.
fn merge_blocks(blocks: &[Block], out: &mut [Label]) -> Result<DisjointSet, LabelError> {
    let total: usize = blocks.iter().map(|b| b.count).sum();
    if total >= Label::MAX as usize {
        return Err(LabelError::TooManyComponents);
    }
    let mut base: Label = 0;
    for block in blocks {
        let dst = &mut out[block.range.clone()];
        for (d, &l) in dst.iter_mut().zip(&block.labels) {
            if l != 0 {
                *d = base + l;
            }
        }
        base += block.count as Label;
    }
    Ok(DisjointSet::with_len(total))
}

/// Union labels across the seam in front of the slab starting at `start`.
fn stitch_seam(geom: &Geometry, start: usize, labels: &[Label], sets: &mut DisjointSet) {
    let end = (start + geom.unit).min(labels.len());
    for offset in start..end {
        let l = labels[offset];
        if l == 0 {
            continue;
        }
        let at = geom.coords(offset);
        for &delta in &geom.backward {
            let Some(nb) = geom.neighbor(at, delta) else {
                continue;
            };
            if nb >= start || labels[nb] == 0 {
                continue;
            }
            sets.union(l, labels[nb]);
        }
    }
}

/// Replace provisional ids by dense ids in first-appearance order.
fn renumber(
    geom: &Geometry,
    labels: &mut [Label],
    sets: &mut DisjointSet,
    cancel: Option<&CancelFlag>,
) -> Result<Label, LabelError> {
    let mut dense = vec![0 as Label; sets.len() + 1];
    let mut next: Label = 0;
    for (offset, l) in labels.iter_mut().enumerate() {
        if offset % geom.cols() == 0 {
            check_cancel(cancel)?;
        }
        if *l == 0 {
            continue;
        }
        let root = sets.find(*l) as usize;
        if dense[root] == 0 {
            next += 1;
            dense[root] = next;
        }
        *l = dense[root];
    }
    Ok(next)
}
