use bintools_core::{GridView, Mask, Sample};
use serde::{Deserialize, Serialize};

/// Comparison sense of the threshold predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Foreground iff `value >= threshold`.
    #[default]
    GreaterEqual,
    /// Foreground iff `value <= threshold`.
    LessEqual,
}

impl Direction {
    #[inline]
    pub fn accepts(self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::GreaterEqual => value >= threshold,
            Direction::LessEqual => value <= threshold,
        }
    }
}

/// Binarize `grid` against `threshold`. NaN samples are background.
pub fn apply_threshold<T: Sample>(
    grid: &GridView<'_, T>,
    threshold: f64,
    direction: Direction,
) -> Mask {
    grid.mask_where(|v| direction.accepts(v, threshold))
}
