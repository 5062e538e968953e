use bintools_core::{GridView, Sample};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::histogram::{finite_range, Histogram};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors returned by threshold selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("grid has no finite samples")]
    EmptyInput,
    /// Every finite sample equals `value`; no split exists. Callers that
    /// want a single phase use `value` itself as the cutoff.
    #[error("all samples equal {value}; no threshold separates them")]
    DegenerateDistribution { value: f64 },
    #[error("histogram bin count must lie in 1..={max} (got {bins})", max = crate::MAX_BINS)]
    InvalidBins { bins: usize },
    #[error("percentile fraction must lie in [0, 1] (got {fraction})")]
    InvalidFraction { fraction: f64 },
}

fn default_bins() -> usize {
    256
}

/// Global threshold selection policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Maximise the between-class variance of a `bins`-bucket histogram.
    Otsu {
        #[serde(default = "default_bins")]
        bins: usize,
    },
    /// Sample at rank `fraction * (n - 1)` of the sorted finite samples.
    Percentile { fraction: f64 },
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Otsu {
            bins: default_bins(),
        }
    }
}

/// Select a cutoff separating the two dominant value populations of `grid`.
///
/// Deterministic for identical input. Non-finite samples are ignored.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(grid), fields(len = grid.len()))
)]
pub fn compute_global_threshold<T: Sample>(
    grid: &GridView<'_, T>,
    method: &ThresholdMethod,
) -> Result<f64, ThresholdError> {
    let threshold = match *method {
        ThresholdMethod::Otsu { bins } => {
            let hist = Histogram::from_view(grid, bins)?;
            otsu_threshold(&hist)
        }
        ThresholdMethod::Percentile { fraction } => percentile_threshold(grid, fraction)?,
    };
    debug!("{method:?} threshold = {threshold}");
    Ok(threshold)
}

/// Otsu cutoff on a histogram with a non-degenerate range.
///
/// Returns the upper edge of the last bucket of the lower class. With at
/// most two populated buckets the midpoint of the range is used instead.
pub(crate) fn otsu_threshold(hist: &Histogram) -> f64 {
    if hist.populated_bins() <= 2 {
        return 0.5 * (hist.min() + hist.max());
    }

    let total = hist.total() as f64;
    let sum_total: f64 = hist
        .counts()
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 0usize;

    for (t, &h) in hist.counts().iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t;
        }
    }

    hist.upper_edge(best_t)
}

fn percentile_threshold<T: Sample>(
    grid: &GridView<'_, T>,
    fraction: f64,
) -> Result<f64, ThresholdError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(ThresholdError::InvalidFraction { fraction });
    }
    let (min, max) = finite_range(grid).ok_or(ThresholdError::EmptyInput)?;
    if min == max {
        return Err(ThresholdError::DegenerateDistribution { value: min });
    }

    let mut values: Vec<f64> = grid.values_f64().filter(|v| v.is_finite()).collect();
    values.sort_unstable_by(f64::total_cmp);
    let rank = (fraction * (values.len() - 1) as f64).round() as usize;
    Ok(values[rank.min(values.len() - 1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bimodal() -> Vec<u8> {
        let mut data = Vec::new();
        for v in [10u8, 11, 12, 13, 12, 11, 10, 12] {
            data.push(v);
        }
        for v in [200u8, 201, 205, 199, 202, 203, 200, 204] {
            data.push(v);
        }
        data
    }

    #[test]
    fn otsu_splits_bimodal_populations() {
        let data = bimodal();
        let view = GridView::from_slice(&[4, 4], &data).expect("view");
        let t = compute_global_threshold(&view, &ThresholdMethod::default()).expect("threshold");
        assert!(t > 13.0 && t <= 199.0, "threshold {t} should separate modes");
    }

    #[test]
    fn otsu_is_deterministic() {
        let data: Vec<f32> = (0..64).map(|i| ((i * 37) % 64) as f32 * 0.5).collect();
        let view = GridView::from_slice(&[8, 8], &data).expect("view");
        let m = ThresholdMethod::Otsu { bins: 32 };
        let a = compute_global_threshold(&view, &m).expect("a");
        let b = compute_global_threshold(&view, &m).expect("b");
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn two_level_input_uses_midpoint() {
        let mut data = [0.0f64; 25];
        data[11] = 1.0;
        data[12] = 1.0;
        data[13] = 1.0;
        let view = GridView::from_slice(&[5, 5], &data).expect("view");
        let t = compute_global_threshold(&view, &ThresholdMethod::default()).expect("t");
        assert_relative_eq!(t, 0.5);
    }

    #[test]
    fn empty_grid_fails() {
        let data: [f32; 0] = [];
        let view = GridView::from_slice(&[0, 4], &data).expect("view");
        assert_eq!(
            compute_global_threshold(&view, &ThresholdMethod::default()),
            Err(ThresholdError::EmptyInput)
        );
        let nan = [f32::NAN; 4];
        let view = GridView::from_slice(&[2, 2], &nan).expect("view");
        assert_eq!(
            compute_global_threshold(&view, &ThresholdMethod::Percentile { fraction: 0.5 }),
            Err(ThresholdError::EmptyInput)
        );
    }

    #[test]
    fn constant_grid_reports_its_value() {
        let data = [3i32; 8];
        let view = GridView::from_slice(&[2, 2, 2], &data).expect("view");
        for method in [
            ThresholdMethod::default(),
            ThresholdMethod::Percentile { fraction: 0.9 },
        ] {
            assert_eq!(
                compute_global_threshold(&view, &method),
                Err(ThresholdError::DegenerateDistribution { value: 3.0 })
            );
        }
    }

    #[test]
    fn percentile_picks_rounded_rank() {
        let data: Vec<u16> = (0..11).rev().collect();
        let view = GridView::from_slice(&[1, 11], &data).expect("view");
        let median = ThresholdMethod::Percentile { fraction: 0.5 };
        assert_relative_eq!(compute_global_threshold(&view, &median).expect("t"), 5.0);
        let top = ThresholdMethod::Percentile { fraction: 1.0 };
        assert_relative_eq!(compute_global_threshold(&view, &top).expect("t"), 10.0);
        let bad = ThresholdMethod::Percentile { fraction: 1.5 };
        assert!(matches!(
            compute_global_threshold(&view, &bad),
            Err(ThresholdError::InvalidFraction { .. })
        ));
    }

    #[test]
    fn method_json_shape() {
        let m: ThresholdMethod = serde_json::from_str(r#"{"kind":"otsu"}"#).expect("otsu");
        assert_eq!(m, ThresholdMethod::Otsu { bins: 256 });
        let p: ThresholdMethod =
            serde_json::from_str(r#"{"kind":"percentile","fraction":0.25}"#).expect("pct");
        assert_eq!(p, ThresholdMethod::Percentile { fraction: 0.25 });
    }

    #[test]
    fn configured_bin_count_is_bounded() {
        let m: ThresholdMethod =
            serde_json::from_str(r#"{"kind":"otsu","bins":18446744073709551615}"#).expect("otsu");
        let data = bimodal();
        let view = GridView::from_slice(&[4, 4], &data).expect("view");
        assert_eq!(
            compute_global_threshold(&view, &m),
            Err(ThresholdError::InvalidBins { bins: usize::MAX })
        );
    }
}
