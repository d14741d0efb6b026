use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LoadError;
use crate::import::{has_extension, ImportFormat};
use crate::models::Observation;

/// Importer for a JSON array of observations
///
/// Each element needs a `day` (`YYYY-MM-DD`); `nocturnal_hrv` and
/// `average_heart_rate` may be null or omitted.
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<Observation>, LoadError> {
        let reader = BufReader::new(File::open(file_path)?);
        let observations: Vec<Observation> = serde_json::from_reader(reader)?;
        Ok(observations)
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_import_json_array() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"day": "2023-01-01", "nocturnal_hrv": 41.5, "average_heart_rate": 58.0}},
                {{"day": "2023-01-02", "nocturnal_hrv": null}}
            ]"#
        )
        .unwrap();
        file.flush().unwrap();

        let observations = JsonImporter::new().import_file(file.path()).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].day, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(observations[1].nocturnal_hrv, None);
        assert_eq!(observations[1].average_heart_rate, None);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"nocturnal_hrv": 41.5}}]"#).unwrap();
        file.flush().unwrap();

        let err = JsonImporter::new().import_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }
}
