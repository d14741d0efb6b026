use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisConfig, HrvAnalyzer, MAX_PRIOR_WINDOW_DAYS};
use crate::dashboard::{Dashboard, DEFAULT_WINDOW_SIZES};
use crate::error::HrvDashError;
use crate::logging::LogConfig;

/// Window size used when neither the command line nor the file picks one
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Last day of the reference export; later rows are ignored by default
pub fn default_cutoff() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 2, 28)
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Input file and date cutoff
    pub data: DataSettings,

    /// Dashboard window sizes
    pub window: WindowSettings,

    /// Statistics pipeline tunables
    pub analysis: AnalysisConfig,

    /// Logging output
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Where observations come from and how much of them to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Default input file when `--file` is not given
    pub input_path: Option<PathBuf>,

    /// Observations after this day are discarded at load time
    pub cutoff_date: Option<NaiveDate>,

    /// Set to false to keep every observation regardless of `cutoff_date`
    pub apply_cutoff: bool,
}

/// Permitted dashboard windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window sizes the dashboard accepts, in nights
    pub allowed_sizes: Vec<usize>,

    /// Window shown when none is requested
    pub default_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            data: DataSettings::default(),
            window: WindowSettings::default(),
            analysis: AnalysisConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        ConfigMetadata {
            version: "1.0".to_string(),
            updated_at: Utc::now(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            input_path: None,
            cutoff_date: default_cutoff(),
            apply_cutoff: true,
        }
    }
}

impl DataSettings {
    /// The cutoff actually applied at load time
    pub fn effective_cutoff(&self) -> Option<NaiveDate> {
        if self.apply_cutoff {
            self.cutoff_date
        } else {
            None
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            allowed_sizes: DEFAULT_WINDOW_SIZES.to_vec(),
            default_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hrvdash")
            .join("config.toml")
    }

    /// Load the default file, falling back to built-in defaults
    ///
    /// A missing file is not an error; an unreadable or invalid one is reported and ignored.
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!(
                    "Ignoring config file {}: {:#}",
                    config_path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load an explicitly requested file, or the default one
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_or_default()),
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> std::result::Result<(), HrvDashError> {
        let sizes = &self.window.allowed_sizes;
        if sizes.is_empty() {
            return Err(HrvDashError::Configuration(
                "window.allowed_sizes must not be empty".to_string(),
            ));
        }
        if sizes.contains(&0) {
            return Err(HrvDashError::Configuration(
                "window.allowed_sizes must be positive".to_string(),
            ));
        }
        if !sizes.contains(&self.window.default_size) {
            return Err(HrvDashError::Configuration(format!(
                "window.default_size {} is not one of {:?}",
                self.window.default_size, sizes
            )));
        }
        let prior_days = self.analysis.prior_window_days;
        if prior_days == 0 || prior_days > MAX_PRIOR_WINDOW_DAYS {
            return Err(HrvDashError::Configuration(format!(
                "analysis.prior_window_days must be between 1 and {}, got {}",
                MAX_PRIOR_WINDOW_DAYS, prior_days
            )));
        }
        Ok(())
    }

    /// Look up a value by dotted key, e.g. `window.default_size`
    pub fn get(&self, key: &str) -> Result<String> {
        let root = toml::Value::try_from(self)
            .with_context(|| "Failed to serialize configuration")?;

        let mut value = &root;
        for part in key.split('.') {
            value = value
                .get(part)
                .with_context(|| format!("Unknown configuration key: {}", key))?;
        }

        Ok(match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Dashboard wired with the configured analyzer and window sizes
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            HrvAnalyzer::with_config(self.analysis.clone()),
            self.window.allowed_sizes.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data.cutoff_date, NaiveDate::from_ymd_opt(2023, 2, 28));
        assert_eq!(config.window.allowed_sizes, vec![7, 30, 90]);
        assert_eq!(config.window.default_size, 30);
        assert_eq!(config.analysis.prior_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.data, deserialized.data);
        assert_eq!(config.window, deserialized.window);
        assert_eq!(config.logging, deserialized.logging);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [window]
            allowed_sizes = [14, 28]
            default_size = 14

            [data]
            apply_cutoff = false
            "#,
        )
        .unwrap();

        assert_eq!(config.window.allowed_sizes, vec![14, 28]);
        assert_eq!(config.data.cutoff_date, default_cutoff());
        assert_eq!(config.data.effective_cutoff(), None);
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.dashboard().allowed_sizes(), &[14, 28]);
    }

    #[test]
    fn test_validation_rejects_inconsistent_windows() {
        let mut config = AppConfig::default();
        config.window.default_size = 14;
        assert!(matches!(
            config.validate(),
            Err(HrvDashError::Configuration(_))
        ));

        config.window.allowed_sizes = vec![];
        assert!(config.validate().is_err());

        config.window.allowed_sizes = vec![0, 14];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_prior_window() {
        let mut config: AppConfig =
            toml::from_str("[analysis]\nprior_window_days = 200000000\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(HrvDashError::Configuration(_))
        ));

        config.analysis.prior_window_days = 0;
        assert!(config.validate().is_err());

        config.analysis.prior_window_days = MAX_PRIOR_WINDOW_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_dotted_key() {
        let config = AppConfig::default();
        assert_eq!(config.get("window.default_size").unwrap(), "30");
        assert_eq!(config.get("data.cutoff_date").unwrap(), "2023-02-28");
        assert_eq!(config.get("logging.level").unwrap(), "warn");
        assert!(config.get("window.nope").is_err());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.data.input_path = Some(PathBuf::from("data/oura.csv"));
        original.analysis.prior_window_days = 28;

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.data.input_path, Some(PathBuf::from("data/oura.csv")));
        assert_eq!(loaded.analysis.prior_window_days, 28);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[window]\ndefault_size = 45\n").unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
    }
}
