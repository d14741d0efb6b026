use serde::Serialize;
use std::path::Path;

use super::ExportError;
use crate::dashboard::{DashboardReport, NOT_ENOUGH_DATA};

/// One cell of a dashboard table in long form
#[derive(Debug, Serialize)]
struct CellRecord<'a> {
    section: &'a str,
    table: &'a str,
    metric: &'a str,
    column: &'a str,
    value: &'a str,
}

fn write_report<W: std::io::Write>(
    report: &DashboardReport,
    writer: &mut ::csv::Writer<W>,
) -> Result<(), ExportError> {
    for section in report.sections() {
        if let Some(reason) = section.insufficient_reason {
            writer.serialize(CellRecord {
                section: section.heading,
                table: "",
                metric: NOT_ENOUGH_DATA,
                column: "",
                value: reason,
            })?;
            continue;
        }

        for table in section.tables {
            for row in &table.rows {
                let Some((metric, values)) = row.split_first() else {
                    continue;
                };
                for (column, value) in table.headers.iter().skip(1).zip(values) {
                    writer.serialize(CellRecord {
                        section: section.heading,
                        table: &table.title,
                        metric,
                        column,
                        value,
                    })?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Flatten every table into `section,table,metric,column,value` rows
pub fn report_to_csv(report: &DashboardReport) -> Result<String, ExportError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    write_report(report, &mut writer)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Export the flattened tables to a CSV file
pub fn export_tables<P: AsRef<Path>>(report: &DashboardReport, output_path: P) -> Result<(), ExportError> {
    let mut writer = ::csv::Writer::from_path(output_path)?;
    write_report(report, &mut writer)
}
