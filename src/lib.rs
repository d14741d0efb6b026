// Library interface for hrvdash modules
// The binary and the integration tests both go through here

pub mod analysis;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod descriptive;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisConfig, HrvAnalyzer};
pub use config::AppConfig;
pub use dashboard::{Dashboard, DashboardReport, Section, DEFAULT_WINDOW_SIZES};
pub use error::{AnalysisError, HrvDashError, LoadError, Result};
pub use export::{ExportError, ExportFormat};
pub use import::ImportManager;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
