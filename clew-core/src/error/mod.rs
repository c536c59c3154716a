//! Core error types for Clew

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Clew operations
#[derive(Error, Debug)]
pub enum ClewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A raw read container could not be opened. Per-read and non-fatal:
    /// callers warn and skip the read.
    #[error("corrupt read container {path}: {reason}")]
    CorruptInput { path: PathBuf, reason: String },

    /// An expected dataset is absent from a read container, which signals
    /// an incompatible or incomplete capture. Per-read and non-fatal.
    #[error("missing dataset {dataset} in {path}")]
    MissingData { path: PathBuf, dataset: String },

    /// The pore-model file is structurally invalid. Fatal: no normalization
    /// is possible without a model.
    #[error("malformed pore model, line {line}: {reason}")]
    MalformedModel { line: usize, reason: String },

    /// A called k-mer has no entry in the pore model.
    #[error("k-mer {0} absent from pore model")]
    UnknownKmer(String),

    /// The calibration normal equations are unsolvable for a read, e.g.
    /// fewer than two distinct qualifying events. The read is skipped.
    #[error("singular calibration system (det = {det:e})")]
    SingularMatrix { det: f64 },

    #[error("parsing error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("external tool error: {0}")]
    Tool(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Clew operations
pub type ClewResult<T> = Result<T, ClewError>;

impl ClewError {
    /// Whether this error is local to a single read and should be skipped
    /// rather than aborting the run.
    pub fn is_per_read(&self) -> bool {
        matches!(
            self,
            ClewError::CorruptInput { .. }
                | ClewError::MissingData { .. }
                | ClewError::SingularMatrix { .. }
                | ClewError::UnknownKmer(_)
        )
    }
}

impl From<toml::de::Error> for ClewError {
    fn from(err: toml::de::Error) -> Self {
        ClewError::Configuration(err.to_string())
    }
}
