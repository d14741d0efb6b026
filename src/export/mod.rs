use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::dashboard::DashboardReport;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Boxed tables, one per metric group
    Table,
    /// Plain `Metric: value` lines
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ExportFormat::Table),
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// Guess the format from an output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Pick the output format: an explicit name wins, then the output file
    /// extension, then boxed tables
    pub fn resolve(explicit: Option<&str>, output: Option<&Path>) -> Result<Self, ExportError> {
        match explicit {
            Some(name) => name.parse(),
            None => Ok(output.and_then(Self::from_path).unwrap_or(ExportFormat::Table)),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Render a report in the requested format
///
/// `color` only affects [`ExportFormat::Table`].
pub fn render_report(
    report: &DashboardReport,
    format: ExportFormat,
    color: bool,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Table => Ok(text::render_tables(report, color)?),
        ExportFormat::Text => Ok(text::render_plain(report)?),
        ExportFormat::Json => json::report_to_json(report),
        ExportFormat::Csv => csv::report_to_csv(report),
    }
}

/// Write a report to a file, without terminal colors
pub fn export_report<P: AsRef<Path>>(
    report: &DashboardReport,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let rendered = render_report(report, format, false)?;
    std::fs::write(&output_path, rendered)?;

    tracing::info!(
        path = %output_path.as_ref().display(),
        format = ?format,
        "Report exported"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("table".parse::<ExportFormat>().unwrap(), ExportFormat::Table);
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out/report.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("report.txt")), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::from_path(Path::new("report")), None);
    }

    #[test]
    fn test_format_resolution() {
        let json = Some(Path::new("out/report.json"));
        assert_eq!(ExportFormat::resolve(None, json).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::resolve(Some("csv"), json).unwrap(), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::resolve(None, Some(Path::new("report.out"))).unwrap(),
            ExportFormat::Table
        );
        assert_eq!(ExportFormat::resolve(None, None).unwrap(), ExportFormat::Table);
        assert!(ExportFormat::resolve(Some("pdf"), None).is_err());
    }
}
