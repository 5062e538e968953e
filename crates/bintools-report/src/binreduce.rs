use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BinReduceError {
    #[error("weights and bins differ in length ({weights} vs {bins})")]
    LengthMismatch { bins: usize, weights: usize },
    #[error("unknown reduction '{op}' (expected 'min' or 'max')")]
    UnknownOp { op: String },
}

/// Reduction applied within each bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    Min,
    Max,
}

impl FromStr for ReduceOp {
    type Err = BinReduceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(ReduceOp::Min),
            "max" => Ok(ReduceOp::Max),
            other => Err(BinReduceError::UnknownOp {
                op: other.to_string(),
            }),
        }
    }
}

/// Reduce `weights[i]` into slot `bins[i]`.
///
/// The output has `max(max(bins) + 1, min_length)` slots. Slots that
/// receive no weight hold NaN, and NaN weights never displace a number.
/// Empty `bins` yield `min_length` zeros.
pub fn binreduce(
    op: ReduceOp,
    bins: &[usize],
    weights: &[f64],
    min_length: usize,
) -> Result<Vec<f64>, BinReduceError> {
    let Some(&top) = bins.iter().max() else {
        return Ok(vec![0.0; min_length]);
    };
    if weights.len() != bins.len() {
        return Err(BinReduceError::LengthMismatch {
            bins: bins.len(),
            weights: weights.len(),
        });
    }

    let mut out = vec![f64::NAN; (top + 1).max(min_length)];
    let reduce: fn(f64, f64) -> f64 = match op {
        ReduceOp::Min => f64::min,
        ReduceOp::Max => f64::max,
    };
    for (&bin, &w) in bins.iter().zip(weights) {
        out[bin] = reduce(out[bin], w);
    }
    Ok(out)
}
