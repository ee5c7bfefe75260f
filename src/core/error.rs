//! # Error Module / 错误模块
//!
//! Typed failures of a single spectrum comparison. Every variant maps onto a
//! [`FailureReason`](crate::core::models::FailureReason) so that results can be
//! classified in the console summary and in the HTML report.
//!
//! 单次光谱比较的类型化错误。每个变体都对应一个 `FailureReason`，
//! 以便在控制台摘要和 HTML 报告中对结果进行分类。

use std::path::PathBuf;
use thiserror::Error;

use crate::core::models::FailureReason;

/// Result alias used throughout the comparison pipeline.
pub type ComparisonResult<T> = Result<T, ComparisonError>;

#[derive(Debug, Error)]
pub enum ComparisonError {
    /// The external simulation could not be started.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external simulation exited unsuccessfully.
    #[error("`{command}` exited with {status}")]
    ExternalCommand {
        command: String,
        status: String,
        output: String,
    },

    /// The external simulation ran longer than the configured timeout and was killed.
    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("cannot read spectrum file {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    MalformedInput {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("spectrum file {} contains no data rows", path.display())]
    EmptySpectrum { path: PathBuf },

    /// Two samples share the same wavelength, so the curve is not a function of wavelength.
    #[error("spectrum {} has duplicate wavelength {x}", path.display())]
    NonMonotonic { path: PathBuf, x: f64 },

    #[error("reference wavelength {x} lies outside the data domain [{min}, {max}]")]
    InterpolationDomain { x: f64, min: f64, max: f64 },

    #[error("normalization constant at wavelength {x} is {value}")]
    DegenerateNormalization { x: f64, value: f64 },

    #[error("maximum deviation {max:.4} exceeds the allowed {limit:.4}")]
    DeviationExceeded { max: f64, limit: f64 },

    /// A deviation limit is set but the curves share no wavelength inside the window.
    #[error("no common wavelengths to compare inside [{min}, {max}]")]
    NoOverlap { min: f64, max: f64 },

    #[error("failed to render or store the report page: {0}")]
    Report(String),

    #[error("interactive acknowledgment failed: {0}")]
    Acknowledge(String),

    #[error("failed to prepare the working directory: {0}")]
    Isolation(String),

    #[error("failed to remove artifact {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run interrupted")]
    Cancelled,
}

impl ComparisonError {
    /// Maps the error onto the coarse category shown in reports.
    pub fn reason(&self) -> FailureReason {
        match self {
            ComparisonError::Spawn { .. } | ComparisonError::ExternalCommand { .. } => {
                FailureReason::ExternalCommand
            }
            ComparisonError::Timeout { .. } => FailureReason::Timeout,
            ComparisonError::MissingInput { .. }
            | ComparisonError::MalformedInput { .. }
            | ComparisonError::EmptySpectrum { .. }
            | ComparisonError::NonMonotonic { .. } => FailureReason::InputFile,
            ComparisonError::InterpolationDomain { .. }
            | ComparisonError::DegenerateNormalization { .. } => FailureReason::Normalization,
            ComparisonError::DeviationExceeded { .. } | ComparisonError::NoOverlap { .. } => FailureReason::Deviation,
            ComparisonError::Report(_) | ComparisonError::Acknowledge(_) => FailureReason::Report,
            ComparisonError::Isolation(_) => FailureReason::Setup,
            ComparisonError::Cleanup { .. } => FailureReason::Cleanup,
            ComparisonError::Cancelled => FailureReason::Cancelled,
        }
    }

    /// Captured process output, when the failure came from the external command.
    pub fn command_output(&self) -> Option<&str> {
        match self {
            ComparisonError::ExternalCommand { output, .. } => Some(output),
            _ => None,
        }
    }
}
