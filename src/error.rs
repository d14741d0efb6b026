//! Unified error hierarchy for hrvdash
//!
//! Load-time failures are reported eagerly with the offending column or row,
//! while empty aggregation inputs surface as [`AnalysisError::InsufficientData`]
//! so the display layer can render a "not enough data" state.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all hrvdash operations
#[derive(Debug, Error)]
pub enum HrvDashError {
    /// Input file loading and validation errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Statistics pipeline errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading observations from disk
#[derive(Debug, Error)]
pub enum LoadError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No importer understands this file
    #[error("Unsupported input format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// A required column is absent from the header
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A cell could not be parsed
    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Underlying CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying JSON decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO failure while reading the input
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the statistics pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Not enough readings to compute the requested view
    #[error("Insufficient data for {analysis}: {reason}")]
    InsufficientData { analysis: String, reason: String },

    /// Window size not permitted by configuration
    #[error("Invalid window size {size}: allowed sizes are {allowed:?}")]
    InvalidWindowSize { size: usize, allowed: Vec<usize> },
}

impl AnalysisError {
    pub(crate) fn insufficient(analysis: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            analysis: analysis.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for hrvdash operations
pub type Result<T> = std::result::Result<T, HrvDashError>;

impl HrvDashError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HrvDashError::Analysis(AnalysisError::InsufficientData { .. }) => ErrorSeverity::Info,
            HrvDashError::Analysis(AnalysisError::InvalidWindowSize { .. }) => {
                ErrorSeverity::Warning
            }
            HrvDashError::Load(LoadError::FileNotFound { .. }) => ErrorSeverity::Warning,
            HrvDashError::Configuration(_) => ErrorSeverity::Warning,
            HrvDashError::Load(_) => ErrorSeverity::Error,
            HrvDashError::Export(_) | HrvDashError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HrvDashError::Load(LoadError::FileNotFound { path }) => {
                format!("Could not find data file: {}", path.display())
            }
            HrvDashError::Load(LoadError::MissingColumn { column, .. }) => {
                format!(
                    "The data file has no '{}' column. Expected columns: {}.",
                    column,
                    crate::import::csv::REQUIRED_COLUMNS.join(", ")
                )
            }
            HrvDashError::Analysis(AnalysisError::InsufficientData { analysis, .. }) => {
                format!("Not enough data to compute {}.", analysis)
            }
            HrvDashError::Analysis(AnalysisError::InvalidWindowSize { size, allowed }) => {
                format!(
                    "{} days is not an available period. Choose one of {:?}.",
                    size, allowed
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that the user can act on
    Warning,
    /// Informational, e.g. a view without enough data
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
