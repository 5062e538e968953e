//! Stage-aware logging for tools built on `bintools`.
//!
//! Every stage crate logs under its own target (`bintools_threshold`,
//! `bintools_label`, ...). A [`LogConfig`] sets one default level plus
//! optional per-stage overrides, so a run can trace labeling while keeping
//! the other stages quiet. [`init_logging`] installs a stderr logger that
//! applies it; with the `tracing` feature, [`init_tracing`] turns the same
//! config into an `EnvFilter`.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Verbosity threshold, serialised in lowercase (`"debug"`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Segmentation stages that emit log records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Threshold,
    Label,
    Morph,
    Report,
    /// The facade: parameter handling, stage sequencing, config/report I/O.
    Pipeline,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Threshold,
        Stage::Label,
        Stage::Morph,
        Stage::Report,
        Stage::Pipeline,
    ];

    /// Crate name used as the `log` target root of this stage.
    pub fn target(self) -> &'static str {
        match self {
            Stage::Threshold => "bintools_threshold",
            Stage::Label => "bintools_label",
            Stage::Morph => "bintools_morph",
            Stage::Report => "bintools_report",
            Stage::Pipeline => "bintools",
        }
    }

    /// Stage owning `target`, if any. `bintools_label::labeler` belongs to
    /// `Label`; `bintools_core` belongs to none.
    pub fn of_target(target: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| {
            target
                .strip_prefix(s.target())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

/// Default level plus per-stage overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub stages: BTreeMap<Stage, LogLevel>,
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            stages: BTreeMap::new(),
        }
    }

    pub fn with_stage(mut self, stage: Stage, level: LogLevel) -> Self {
        self.stages.insert(stage, level);
        self
    }

    /// Level in force for records logged under `target`.
    pub fn level_for(&self, target: &str) -> LogLevel {
        Stage::of_target(target)
            .and_then(|s| self.stages.get(&s).copied())
            .unwrap_or(self.level)
    }

    /// Most verbose level any target can reach.
    pub fn max_level(&self) -> LogLevel {
        self.stages
            .values()
            .copied()
            .fold(self.level, LogLevel::max)
    }

    /// `EnvFilter`-style directives, e.g. `warn,bintools_label=debug`.
    pub fn directives(&self) -> String {
        let mut out = self.level.as_str().to_string();
        for (stage, level) in &self.stages {
            out.push_str(&format!(",{}={}", stage.target(), level.as_str()));
        }
        out
    }
}

struct StageLogger {
    config: LogConfig,
    started: Instant,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= LevelFilter::from(self.config.level_for(metadata.target()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let origin = match Stage::of_target(record.target()) {
            Some(stage) => format!("{stage:?}").to_lowercase(),
            None => record.target().to_string(),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{:>9.3}s {:<5} {origin}: {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger for `config`.
///
/// Only the first call in a process installs anything; later configs are
/// ignored.
pub fn init_logging(config: &LogConfig) -> Result<(), SetLoggerError> {
    let mut fresh = false;
    let logger = LOGGER.get_or_init(|| {
        fresh = true;
        StageLogger {
            config: config.clone(),
            started: Instant::now(),
        }
    });
    if fresh {
        log::set_logger(logger)?;
        log::set_max_level(config.max_level().into());
    }
    Ok(())
}

/// Install a `tracing` subscriber filtered by `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config`.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: &LogConfig, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.with_target(true).try_init()
    };
}
