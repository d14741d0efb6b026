use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use hrvdash::error::ErrorSeverity;
use hrvdash::export::{self, ExportFormat};
use hrvdash::logging::{init_logging, LogFormat};
use hrvdash::{AppConfig, HrvDashError, ImportManager};

/// hrvdash - Nocturnal HRV Dashboard CLI
///
/// Summarizes nightly heart rate variability and heart rate from a sleep
/// tracker export over a 7, 30 or 90 night window.
#[derive(Parser)]
#[command(name = "hrvdash")]
#[command(version)]
#[command(about = "Nocturnal HRV dashboard", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, compact, json)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard for one window
    Dashboard {
        /// Input file (CSV or JSON); defaults to data.input_path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Window size in nights; defaults to window.default_size
        #[arg(short, long)]
        days: Option<usize>,

        /// Ignore observations after this day (YYYY-MM-DD)
        #[arg(long, conflicts_with = "no_cutoff")]
        cutoff: Option<NaiveDate>,

        /// Keep every observation regardless of the configured cutoff
        #[arg(long)]
        no_cutoff: bool,

        /// Output format (table, text, json, csv); defaults to the --output
        /// extension, then table
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the chart specifications as JSON
        #[arg(long, value_name = "FILE")]
        charts: Option<PathBuf>,

        /// Also write every table as long-form CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Check that an input file loads cleanly
    Validate {
        /// Input file (CSV or JSON); defaults to data.input_path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        list: bool,

        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,

        /// Get a configuration value by dotted key
        #[arg(short, long)]
        get: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<HrvDashError>() {
            Some(app_err) => {
                let label = match app_err.severity() {
                    ErrorSeverity::Error => "Error:".red().bold(),
                    ErrorSeverity::Warning => "Warning:".yellow().bold(),
                    ErrorSeverity::Info => "Note:".cyan().bold(),
                };
                log_failure(app_err.severity().to_tracing_level(), app_err);
                eprintln!("{} {}", label, app_err.user_message());
            }
            None => {
                tracing::error!(error = %err, "Command failed");
                eprintln!("{} {:#}", "Error:".red().bold(), err);
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.command {
        // The file may not exist yet
        Commands::Config { init: true, .. } => AppConfig::default(),
        _ => AppConfig::load(cli.config.as_deref())?,
    };

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    if let Some(format) = &cli.log_format {
        log_config.format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Dashboard {
            file,
            days,
            cutoff,
            no_cutoff,
            format,
            output,
            charts,
            csv,
        } => {
            let file = input_path(file, &config)?;
            let cutoff = if no_cutoff {
                None
            } else {
                cutoff.or_else(|| config.data.effective_cutoff())
            };
            let days = days.unwrap_or(config.window.default_size);
            let format = ExportFormat::resolve(format.as_deref(), output.as_deref())
                .map_err(HrvDashError::from)?;

            let dataset = ImportManager::new()
                .load_dataset(&file, cutoff)
                .map_err(HrvDashError::from)?;
            let report = config
                .dashboard()
                .build(&dataset, days)
                .map_err(HrvDashError::from)?;

            match output {
                Some(path) => {
                    export::export_report(&report, format, &path).map_err(HrvDashError::from)?;
                    eprintln!("{} {}", "✓ Report written to".green(), path.display());
                }
                None => {
                    let rendered =
                        export::render_report(&report, format, format == ExportFormat::Table)
                            .map_err(HrvDashError::from)?;
                    print!("{}", rendered);
                }
            }

            if let Some(path) = charts {
                export::json::export_charts(&report, &path).map_err(HrvDashError::from)?;
                eprintln!("{} {}", "✓ Charts written to".green(), path.display());
            }
            if let Some(path) = csv {
                export::csv::export_tables(&report, &path).map_err(HrvDashError::from)?;
                eprintln!("{} {}", "✓ Tables written to".green(), path.display());
            }
        }

        Commands::Validate { file } => {
            let file = input_path(file, &config)?;
            let dataset = ImportManager::new()
                .load_dataset(&file, config.data.effective_cutoff())
                .map_err(HrvDashError::from)?;

            println!("{}", "✓ Input file is valid".green().bold());
            println!("  File: {}", file.display());
            println!("  Nights: {}", dataset.len());
            println!("  HRV readings: {}", dataset.hrv_count());
            println!("  Heart rate readings: {}", dataset.heart_rate_count());
            if let (Some(first), Some(last)) = (dataset.first_day(), dataset.last_day()) {
                println!("  Range: {} to {}", first, last);
            }
            if let Some(cutoff) = dataset.cutoff() {
                println!("  Cutoff: {}", cutoff);
            }
        }

        Commands::Config { list, init, get } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if init {
                if path.exists() {
                    bail!("Config file already exists: {}", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("{} {}", "✓ Wrote default configuration to".green(), path.display());
            } else if let Some(key) = get {
                println!("{}", config.get(&key)?);
            } else if list {
                println!("{}", format!("# {}", path.display()).dimmed());
                print!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to serialize configuration")?
                );
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn log_failure(level: tracing::Level, err: &HrvDashError) {
    if level == tracing::Level::ERROR {
        tracing::error!(error = %err, "Command failed");
    } else if level == tracing::Level::WARN {
        tracing::warn!(error = %err, "Command failed");
    } else {
        tracing::info!(error = %err, "Command failed");
    }
}

fn input_path(file: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    match file.or_else(|| config.data.input_path.clone()) {
        Some(path) => Ok(path),
        None => bail!(
            "No input file given; pass --file or set data.input_path in {}",
            AppConfig::default_config_path().display()
        ),
    }
}
