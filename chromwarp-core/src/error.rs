use thiserror::Error;

use crate::align::AlignStage;

/// Failure reported by a pluggable cost function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct CostError {
    pub msg: String,
}

impl CostError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Coarse classification of [`WarpError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DegenerateRecurrence,
    CostFunction,
    Cancelled,
    Io,
}

#[derive(Debug, Error)]
pub enum WarpError {
    #[error("invalid configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("{which} series is empty")]
    EmptySeries { which: &'static str },

    #[error("series length mismatch (times={times}, features={features})")]
    SeriesLengthMismatch { times: usize, features: usize },

    #[error("feature dimension mismatch at scan {index}: {dim} (expected {expected})")]
    FeatureDimension {
        index: usize,
        dim: usize,
        expected: usize,
    },

    #[error("feature dimension differs between series ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("invalid mass range [{min}, {max}) with bin width {bin_width}")]
    InvalidMassRange { min: f64, max: f64, bin_width: f64 },

    #[error("anchor '{name}' has negative scan index {index}")]
    NegativeScanIndex { name: String, index: i64 },

    #[error("anchor constraint violated: {msg}")]
    ConstraintViolation { msg: String },

    #[error("band excludes required corner cell ({row}, {col})")]
    BandExcludesCorner { row: usize, col: usize },

    #[error("band of row {row} is empty")]
    EmptyBandRow { row: usize },

    #[error("band layout mismatch: {msg}")]
    LayoutMismatch { msg: String },

    #[error("degenerate recurrence at ({row}, {col}): all predecessors are non-finite")]
    DegenerateRecurrence { row: usize, col: usize },

    #[error("cost function failed at ({row}, {col}): {source}")]
    CostFunction {
        row: usize,
        col: usize,
        #[source]
        source: CostError,
    },

    #[error("alignment cancelled during {stage:?}")]
    Cancelled { stage: AlignStage },

    #[error("traceback left the band at ({row}, {col})")]
    BrokenTraceback { row: usize, col: usize },

    #[cfg(feature = "parallel")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("anchor csv missing column '{name}' in {path}. headers: {headers:?}")]
    CsvMissingColumn {
        name: String,
        headers: Vec<String>,
        path: String,
    },

    #[error("anchor csv invalid scan '{value}' at row {row} in {path}")]
    CsvInvalidScan {
        row: usize,
        value: String,
        path: String,
    },

    #[error("anchor csv parse error in {path}: {source}")]
    CsvParse {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl WarpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WarpError::DegenerateRecurrence { .. } | WarpError::BrokenTraceback { .. } => {
                ErrorKind::DegenerateRecurrence
            }
            WarpError::CostFunction { .. } => ErrorKind::CostFunction,
            WarpError::Cancelled { .. } => ErrorKind::Cancelled,
            WarpError::CsvMissingColumn { .. }
            | WarpError::CsvInvalidScan { .. }
            | WarpError::CsvParse { .. } => ErrorKind::Io,
            _ => ErrorKind::Configuration,
        }
    }
}

pub type WarpResult<T> = Result<T, WarpError>;
