use crate::config::toml_config::FaresConfig;
use crate::domain::ports::ReportSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "weekend-fares")]
#[command(about = "Scan flight providers for cheap weekend round-trips")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "fares.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Show the planned queries without calling the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report instead of using the configured delivery
    #[arg(long)]
    pub stdout: bool,

    /// Override the first day of the calendar (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Override the number of weekends to scan
    #[arg(long)]
    pub weeks: Option<i64>,

    /// Override the price ceiling
    #[arg(long)]
    pub max_price: Option<f64>,

    /// List the built-in destination regions and exit
    #[arg(long)]
    pub list_regions: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut FaresConfig) {
        if let Some(start_date) = self.start_date {
            config.scan.start_date = Some(start_date);
            tracing::info!("🔧 Start date overridden to: {}", start_date);
        }
        if let Some(weeks) = self.weeks {
            config.scan.horizon_weeks = weeks;
            tracing::info!("🔧 Horizon overridden to: {} week(s)", weeks);
        }
        if let Some(max_price) = self.max_price {
            config.filter.max_price = Some(max_price);
            tracing::info!("🔧 Price ceiling overridden to: {}", max_price);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn deliver(&self, report: &str) -> Result<()> {
        println!("{}", report);
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Writes each report over the previous one at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn deliver(&self, report: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, report).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
