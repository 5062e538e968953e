use bintools_core::{GridView, Sample};
use serde::Serialize;

use crate::ThresholdError;

/// Equal-width histogram over the finite samples of a grid.
///
/// Bins span `[min, max]`; the maximum falls into the last bin. Only
/// [`Histogram::from_view`] builds one, so `min < max` and at least one
/// bucket always hold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<u64>,
}

/// Upper bound on the bucket count accepted from configuration.
pub const MAX_BINS: usize = 1 << 16;

impl Histogram {
    /// Bin the finite samples of `grid` into `bins` buckets.
    ///
    /// Fails with [`ThresholdError::EmptyInput`] when no finite sample exists
    /// and with [`ThresholdError::DegenerateDistribution`] when all finite
    /// samples are equal (a zero-width range cannot be binned).
    pub fn from_view<T: Sample>(grid: &GridView<'_, T>, bins: usize) -> Result<Self, ThresholdError> {
        if bins == 0 || bins > MAX_BINS {
            return Err(ThresholdError::InvalidBins { bins });
        }
        let (min, max) = finite_range(grid).ok_or(ThresholdError::EmptyInput)?;
        if min == max {
            return Err(ThresholdError::DegenerateDistribution { value: min });
        }

        let mut hist = Self {
            min,
            max,
            counts: vec![0u64; bins],
        };
        for v in grid.values_f64().filter(|v| v.is_finite()) {
            let bin = hist.bin_of(v);
            hist.counts[bin] += 1;
        }
        Ok(hist)
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Samples per bucket, lowest values first.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Bucket index of `value`, clamped to the histogram range.
    pub fn bin_of(&self, value: f64) -> usize {
        let last = self.counts.len().saturating_sub(1);
        if value <= self.min {
            return 0;
        }
        let idx = ((value - self.min) / self.bin_width()).floor() as usize;
        idx.min(last)
    }

    /// Upper edge of bucket `bin` (the lower edge of `bin + 1`).
    pub fn upper_edge(&self, bin: usize) -> f64 {
        if bin + 1 >= self.counts.len() {
            return self.max;
        }
        self.min + (bin + 1) as f64 * self.bin_width()
    }

    /// Number of binned samples.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of non-empty buckets.
    pub fn populated_bins(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

pub(crate) fn finite_range<T: Sample>(grid: &GridView<'_, T>) -> Option<(f64, f64)> {
    grid.values_f64()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
