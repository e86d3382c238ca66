// src/error.rs

use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Result alias used throughout the library.
pub type ReportResult<T> = Result<T, ReportError>;

/// Everything that can go wrong between reading a solver report and handing
/// tensors to the renderer. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("line {line}: malformed `{prefix}` row `{found}`: {detail}")]
    Format {
        line: usize,
        prefix: String,
        found: String,
        detail: String,
    },

    #[error("malformed report: {detail}")]
    Structural { detail: String },

    #[error("tables disagree on floor keys: {detail}")]
    InconsistentKeys { detail: String },

    #[error(
        "min max drops {min_max} below average drops {average} at floors {floors}, eggs {eggs}"
    )]
    DomainInvariant {
        floors: u32,
        eggs: u32,
        min_max: f64,
        average: f64,
    },

    #[error("solver `{command}` failed: {status}")]
    SubprocessFailure { command: String, status: String },

    #[error("invalid configuration: {detail}")]
    Config { detail: String },

    #[error("i/o on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing {what}: {detail}")]
    Serialize { what: String, detail: String },

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl ReportError {
    pub(crate) fn format(
        index: usize,
        prefix: &str,
        found: &str,
        detail: impl Into<String>,
    ) -> Self {
        ReportError::Format {
            line: index + 1,
            prefix: prefix.to_string(),
            found: found.trim_end().to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn structural(detail: impl Into<String>) -> Self {
        ReportError::Structural {
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
