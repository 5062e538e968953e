use std::collections::BTreeMap;

use bintools_core::{GridError, GridView, Label, LabelField, Sample};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{binreduce, BinReduceError, ReduceOp};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    BinReduce(#[from] BinReduceError),
}

/// Sample statistics of one component over the source grid.
///
/// NaN samples are ignored; a component made only of NaN samples reports
/// NaN for every field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityRecord {
    pub label: Label,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Per-component min/max/mean of `grid`, ascending by label.
pub fn summarize_intensity<T: Sample>(
    labels: &LabelField,
    grid: &GridView<'_, T>,
) -> Result<Vec<IntensityRecord>, ReportError> {
    labels.shape().ensure_same(&grid.shape())?;

    // Ids may be sparse; reduce over dense slots in ascending id order.
    let slot_of: BTreeMap<Label, usize> = labels
        .counts()
        .into_keys()
        .enumerate()
        .map(|(slot, l)| (l, slot))
        .collect();
    let slots = slot_of.len();
    let (bins, weights): (Vec<usize>, Vec<f64>) = labels
        .as_slice()
        .iter()
        .zip(grid.values_f64())
        .filter_map(|(l, v)| slot_of.get(l).map(|&slot| (slot, v)))
        .unzip();

    let mins = binreduce(ReduceOp::Min, &bins, &weights, slots)?;
    let maxs = binreduce(ReduceOp::Max, &bins, &weights, slots)?;

    let mut sums = vec![0f64; slots];
    let mut valid = vec![0usize; slots];
    for (&b, &w) in bins.iter().zip(&weights) {
        if !w.is_nan() {
            sums[b] += w;
            valid[b] += 1;
        }
    }

    debug!("intensity statistics for {slots} components");
    Ok(slot_of
        .into_iter()
        .map(|(label, i)| IntensityRecord {
            label,
            min: mins[i],
            max: maxs[i],
            mean: if valid[i] > 0 {
                sums[i] / valid[i] as f64
            } else {
                f64::NAN
            },
        })
        .collect())
}
