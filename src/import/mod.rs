use chrono::NaiveDate;
use std::path::Path;

use crate::error::LoadError;
use crate::models::{Dataset, Observation};

pub mod csv;
pub mod json;

/// Trait for reading observations from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read every observation in the file, in file order
    fn import_file(&self, file_path: &Path) -> Result<Vec<Observation>, LoadError>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<Observation>, LoadError> {
        if !file_path.exists() {
            return Err(LoadError::FileNotFound {
                path: file_path.to_path_buf(),
            });
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| LoadError::UnsupportedFormat {
                path: file_path.to_path_buf(),
            })?;

        tracing::info!(
            path = %file_path.display(),
            format = importer.get_format_name(),
            "Importing observations"
        );

        importer.import_file(file_path)
    }

    /// Load and validate a file into an immutable dataset
    ///
    /// Observations dated after `cutoff` are dropped before anything else sees them.
    pub fn load_dataset(
        &self,
        file_path: &Path,
        cutoff: Option<NaiveDate>,
    ) -> Result<Dataset, LoadError> {
        let observations = self.import_file(file_path)?;
        let imported = observations.len();
        let dataset = Dataset::new(observations, cutoff);

        tracing::info!(
            imported,
            kept = dataset.len(),
            dropped_after_cutoff = imported - dataset.len(),
            cutoff = ?cutoff,
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn has_extension(file_path: &Path, extension: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_format_detection() {
        let manager = ImportManager::new();
        assert!(manager.can_import_file(Path::new("oura_data.csv")));
        assert!(manager.can_import_file(Path::new("export.JSON")));
        assert!(!manager.can_import_file(Path::new("sleep.fit")));
    }

    #[test]
    fn test_missing_file() {
        let manager = ImportManager::new();
        let err = manager
            .import_file(Path::new("/nonexistent/oura_data.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_unsupported_format() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "not a spreadsheet").unwrap();

        let err = ImportManager::new().import_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_dataset_applies_cutoff() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "day,nocturnal_hrv,average_heart_rate").unwrap();
        writeln!(file, "2023-02-27,41.0,60.1").unwrap();
        writeln!(file, "2023-02-28,43.5,").unwrap();
        writeln!(file, "2023-03-01,50.0,58.0").unwrap();
        file.flush().unwrap();

        let cutoff = NaiveDate::from_ymd_opt(2023, 2, 28);
        let dataset = ImportManager::new().load_dataset(file.path(), cutoff).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.last_day(), cutoff);
        assert_eq!(dataset.observations()[1].average_heart_rate, None);
    }
}
