//! Error types of the delivery pipeline.

use crate::plan::Strategy;
use gh_gist_client::GistError;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// A request rejected before any delivery work starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("diff parameter is required and must be a non-empty string")]
    MissingDiff,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("malformed arguments: {0}")]
    Malformed(String),
}

/// Headless browser failures.
#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("no Chromium or Chrome executable found (set GH_DIFF_SHARE_CHROMIUM)")]
    BrowserNotFound,

    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("browser exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("browser did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("browser produced no image at {0}")]
    NoOutput(PathBuf),

    #[error("failed to stage page for rendering: {0}")]
    Stage(#[source] std::io::Error),
}

/// Failure of the local file strategy.
#[derive(Debug, Error)]
pub enum LocalWriteError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image rendering failed: {0}")]
    Rasterize(#[from] RasterizeError),
}

/// A platform open command that did not work.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    Status { command: String, status: ExitStatus },
}

/// Why one strategy of a plan did not deliver.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Remote(#[from] GistError),

    #[error(transparent)]
    Local(#[from] LocalWriteError),
}

/// One failed attempt, as reported to the caller.
#[derive(Debug)]
pub struct StrategyFailure {
    pub strategy: Strategy,
    pub error: StrategyError,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Failure of a whole delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("all delivery strategies failed: {}", join_failures(.failures))]
    AllStrategiesFailed { failures: Vec<StrategyFailure> },
}

fn join_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
