use std::path::PathBuf;

use thiserror::Error;

use crate::integral::QuadratureRule;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuadratureError {
    #[error("subdivision count must be at least 1")]
    ZeroSubdivisions,

    #[error("interval bounds must be finite with a < b, got [{a}, {b}]")]
    InvalidInterval { a: f64, b: f64 },

    #[error("subdivision count {0} appears more than once")]
    DuplicateSubdivisionCount(usize),

    #[error("no subdivision counts to evaluate")]
    EmptySequence,

    #[error("{rule} rule produced a non-finite value ({value}) for n = {n}")]
    NumericAnomaly {
        rule: QuadratureRule,
        n: usize,
        value: f64,
    },
}

impl QuadratureError {
    /// Whether the error was caused by the caller's arguments rather than by the computation.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, QuadratureError::NumericAnomaly { .. })
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("result table has no entries for n = {0}")]
    MissingSubdivisionCount(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] QuadratureError),

    #[error("report_n = {0} is not one of n_values")]
    UnknownReportN(usize),
}
