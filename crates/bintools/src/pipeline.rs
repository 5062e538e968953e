use bintools_core::{GridError, GridView, LabelField, Sample};
use bintools_label::{CancelFlag, Connectivity, LabelError, Labeler};
use bintools_morph::{fill_holes, relabel_sequential, remove_small_components, MorphError};
use bintools_report::{
    summarize, summarize_intensity, ComponentRecord, IntensityRecord, ReportError,
};
use bintools_threshold::{
    apply_threshold, compute_global_threshold, Direction, ThresholdError, ThresholdMethod,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors returned by [`Binarizer::run`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BinarizeError {
    #[error("fixed threshold must be finite (got {value})")]
    InvalidThreshold { value: f64 },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Morph(#[from] MorphError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Where the cutoff comes from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdSpec {
    Fixed { value: f64 },
    Auto {
        #[serde(default)]
        method: ThresholdMethod,
    },
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        Self::Auto {
            method: ThresholdMethod::default(),
        }
    }
}

fn default_tiles() -> usize {
    1
}

/// Configuration for one segmentation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeParams {
    pub threshold: ThresholdSpec,
    /// Which side of the cutoff is foreground.
    pub direction: Direction,
    /// Foreground connectivity. `None` picks face connectivity for the grid
    /// rank (4 in 2D, 6 in 3D).
    pub connectivity: Option<Connectivity>,
    /// Components with fewer cells become background. 0 and 1 keep all.
    pub min_component_size: usize,
    /// Fill background pockets enclosed by a single component. The pockets
    /// are traced with the complement of the foreground connectivity.
    pub fill_holes: bool,
    /// Renumber surviving components densely after cleanup.
    pub relabel: bool,
    /// Slabs for tiled labeling; workers run in parallel with the
    /// `parallel` feature.
    #[serde(default = "default_tiles")]
    pub tiles: usize,
    /// Also report per-component min/max/mean of the input samples.
    pub intensity_stats: bool,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            threshold: ThresholdSpec::default(),
            direction: Direction::default(),
            connectivity: None,
            min_component_size: 0,
            fill_holes: false,
            relabel: false,
            tiles: default_tiles(),
            intensity_stats: false,
        }
    }
}

/// Output of one segmentation run.
#[derive(Clone, Debug, PartialEq)]
pub struct BinarizeResult {
    /// Cutoff applied to the samples.
    pub threshold: f64,
    /// Set when every finite sample was equal and the grid fell back to a
    /// single phase.
    pub degenerate: bool,
    pub labels: LabelField,
    pub components: Vec<ComponentRecord>,
    pub intensity: Option<Vec<IntensityRecord>>,
}

/// Threshold → label → clean → summarise pipeline.
#[derive(Clone, Debug, Default)]
pub struct Binarizer {
    params: BinarizeParams,
    cancel: Option<CancelFlag>,
}

impl Binarizer {
    pub fn new(params: BinarizeParams) -> Self {
        Self {
            params,
            cancel: None,
        }
    }

    /// Abort labeling with [`LabelError::Cancelled`] once `flag` is set.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn params(&self) -> &BinarizeParams {
        &self.params
    }

    /// Segment `grid` into labelled components.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, grid), fields(extents = ?grid.extents()))
    )]
    pub fn run<T: Sample>(&self, grid: &GridView<'_, T>) -> Result<BinarizeResult, BinarizeError> {
        let params = &self.params;
        let (threshold, degenerate) = self.select_threshold(grid)?;
        let mask = apply_threshold(grid, threshold, params.direction);
        debug!(
            "threshold {threshold} ({:?}) keeps {} of {} cells",
            params.direction,
            mask.count(),
            mask.len()
        );

        let connectivity = params
            .connectivity
            .unwrap_or_else(|| Connectivity::face(grid.ndim()));
        let mut labeler = Labeler::new(connectivity).with_tiles(params.tiles);
        if let Some(flag) = &self.cancel {
            labeler = labeler.with_cancel(flag.clone());
        }
        let mut labels = labeler.label(&mask)?;
        debug!(
            "{} components at {}-connectivity",
            labels.num_components(),
            connectivity.neighbors()
        );

        if params.min_component_size > 1 {
            labels = remove_small_components(&labels, params.min_component_size);
        }
        if params.fill_holes {
            labels = fill_holes(&labels, connectivity.complement())?;
        }
        if params.relabel {
            labels = relabel_sequential(&labels);
        }

        let components = summarize(&labels);
        let intensity = if params.intensity_stats {
            Some(summarize_intensity(&labels, grid)?)
        } else {
            None
        };

        Ok(BinarizeResult {
            threshold,
            degenerate,
            labels,
            components,
            intensity,
        })
    }

    fn select_threshold<T: Sample>(
        &self,
        grid: &GridView<'_, T>,
    ) -> Result<(f64, bool), BinarizeError> {
        match self.params.threshold {
            ThresholdSpec::Fixed { value } if value.is_finite() => Ok((value, false)),
            ThresholdSpec::Fixed { value } => Err(BinarizeError::InvalidThreshold { value }),
            ThresholdSpec::Auto { method } => match compute_global_threshold(grid, &method) {
                Ok(t) => Ok((t, false)),
                Err(ThresholdError::DegenerateDistribution { value }) => {
                    warn!("all samples equal {value}; treating the grid as a single phase");
                    Ok((value, true))
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}
