use std::io::Write;
use std::path::Path;

use super::ExportError;
use crate::dashboard::DashboardReport;

/// Serialize the whole report, tables and chart specs included
pub fn report_to_json(report: &DashboardReport) -> Result<String, ExportError> {
    serde_json::to_string_pretty(report).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Export only the chart specifications, in display order
pub fn export_charts<P: AsRef<Path>>(report: &DashboardReport, output_path: P) -> Result<(), ExportError> {
    export_json(&report.charts(), output_path)
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}
