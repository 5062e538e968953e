//! JSON configuration and report helpers for segmentation runs.

use crate::{BinarizeError, BinarizeParams, BinarizeResult, Binarizer};
use bintools_core::{GridView, LogConfig, Sample, SampleKind};
use bintools_report::{ComponentRecord, IntensityRecord};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum BinarizeIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// On-disk description of a segmentation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinarizeConfig {
    #[serde(default)]
    pub params: BinarizeParams,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Logging levels for the tool running this config.
    #[serde(default)]
    pub log: LogConfig,
}

impl BinarizeConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BinarizeIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BinarizeIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("binarize_report.json"))
    }

    pub fn build_binarizer(&self) -> Binarizer {
        Binarizer::new(self.params.clone())
    }
}

/// Serializable summary of one run; `labels` are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinarizeReport {
    pub extents: Vec<usize>,
    pub sample_kind: SampleKind,
    pub params: BinarizeParams,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub degenerate: bool,
    #[serde(default)]
    pub num_components: usize,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub intensity: Option<Vec<IntensityRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BinarizeReport {
    /// Build a base report for `grid` before the run.
    pub fn new<T: Sample>(grid: &GridView<'_, T>, params: &BinarizeParams) -> Self {
        Self {
            extents: grid.extents().to_vec(),
            sample_kind: T::KIND,
            params: params.clone(),
            threshold: None,
            degenerate: false,
            num_components: 0,
            components: Vec::new(),
            intensity: None,
            error: None,
        }
    }

    /// Populate report fields from a successful run.
    pub fn set_result(&mut self, res: &BinarizeResult) {
        self.threshold = Some(res.threshold);
        self.degenerate = res.degenerate;
        self.num_components = res.components.len();
        self.components = res.components.clone();
        self.intensity = res.intensity.clone();
        self.error = None;
    }

    /// Record a run error.
    pub fn set_error(&mut self, err: &BinarizeError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BinarizeIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BinarizeIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Run `config` over `grid` and capture the outcome, success or failure, in
/// a report.
pub fn run_to_report<T: Sample>(config: &BinarizeConfig, grid: &GridView<'_, T>) -> BinarizeReport {
    let mut report = BinarizeReport::new(grid, &config.params);
    match config.build_binarizer().run(grid) {
        Ok(res) => report.set_result(&res),
        Err(err) => {
            log::warn!("segmentation failed: {err}");
            report.set_error(&err);
        }
    }
    report
}
