use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;
use crate::import::{has_extension, ImportFormat};
use crate::models::Observation;

pub const DAY_COLUMN: &str = "day";
pub const HRV_COLUMN: &str = "nocturnal_hrv";
pub const HEART_RATE_COLUMN: &str = "average_heart_rate";

/// Columns every input file must provide
pub const REQUIRED_COLUMNS: [&str; 3] = [DAY_COLUMN, HRV_COLUMN, HEART_RATE_COLUMN];

/// CSV importer with flexible column naming
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(
            &mut column_mapping,
            DAY_COLUMN,
            &["day", "date", "summary_date", "calendar_date"],
        );
        Self::add_mapping(
            &mut column_mapping,
            HRV_COLUMN,
            &["nocturnal_hrv", "average_hrv", "hrv", "hrv_ms", "rmssd"],
        );
        Self::add_mapping(
            &mut column_mapping,
            HEART_RATE_COLUMN,
            &["average_heart_rate", "avg_heart_rate", "hr_average", "heart_rate"],
        );

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn clean_header(name: &str) -> String {
        name.trim().to_lowercase().replace([' ', '-'], "_")
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = Self::clean_header(name);

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Header index per standard column
    ///
    /// A header spelled exactly like the standard name beats any alias;
    /// among aliases the first one wins.
    fn resolve_columns(&self, headers: &StringRecord) -> HashMap<String, usize> {
        let mut positions: HashMap<String, (usize, bool)> = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let standard = self.normalize_column_name(header);
            let exact = Self::clean_header(header) == standard;
            match positions.get(&standard) {
                None => {
                    positions.insert(standard, (i, exact));
                }
                Some(&(_, false)) if exact => {
                    positions.insert(standard, (i, exact));
                }
                Some(_) => {}
            }
        }

        positions
            .into_iter()
            .map(|(name, (i, _))| (name, i))
            .collect()
    }

    /// Parse a calendar day from ISO-8601 or a common locale format
    pub fn parse_day(value: &str) -> Option<NaiveDate> {
        let value = value.trim();

        let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
        for format in &date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date);
            }
        }

        let datetime_formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%m/%d/%Y %H:%M:%S",
        ];
        for format in &datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt.date());
            }
        }

        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    }

    /// Parse an optional measurement; empty and NaN-like cells are absent
    fn parse_measurement(value: &str) -> Result<Option<f64>, ()> {
        let value = value.trim();
        if value.is_empty()
            || ["nan", "na", "null", "none"]
                .iter()
                .any(|missing| value.eq_ignore_ascii_case(missing))
        {
            return Ok(None);
        }

        match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
            _ => Err(()),
        }
    }

    /// Read observations from any CSV source
    ///
    /// `source` only labels errors.
    pub fn read_observations<R: Read>(
        &self,
        reader: R,
        source: &Path,
    ) -> Result<Vec<Observation>, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();

        let positions = self.resolve_columns(&headers);

        let column = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| LoadError::MissingColumn {
                    column: name.to_string(),
                    path: source.to_path_buf(),
                })
        };
        let mut indices = [0usize; 3];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = column(name)?;
        }
        let [day_idx, hrv_idx, hr_idx] = indices;

        let mut observations = Vec::new();

        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let row = record
                .position()
                .map_or(index + 2, |pos| pos.line() as usize);
            let cell = |idx: usize| record.get(idx).unwrap_or("");
            let invalid = |column: &str, value: &str| LoadError::InvalidValue {
                row,
                column: column.to_string(),
                value: value.to_string(),
            };

            let day = Self::parse_day(cell(day_idx)).ok_or_else(|| invalid(DAY_COLUMN, cell(day_idx)))?;
            let nocturnal_hrv =
                Self::parse_measurement(cell(hrv_idx)).map_err(|_| invalid(HRV_COLUMN, cell(hrv_idx)))?;
            let average_heart_rate = Self::parse_measurement(cell(hr_idx))
                .map_err(|_| invalid(HEART_RATE_COLUMN, cell(hr_idx)))?;

            observations.push(Observation::new(day, nocturnal_hrv, average_heart_rate));
        }

        tracing::debug!(
            rows = observations.len(),
            source = %source.display(),
            "Parsed CSV observations"
        );

        Ok(observations)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<Observation>, LoadError> {
        let file = File::open(file_path)?;
        self.read_observations(file, file_path)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}
