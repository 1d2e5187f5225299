use std::{fmt, path::PathBuf, sync::Arc};

use colored::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    constants::{EXPORT_RESULTS_LIMIT, LATEST_RESULTS_LIMIT},
    report::{Analyzer, MeasurementError, NewRecord, ResultRecord, StoredRecord},
    speed::{MeasurementProvider, measure},
    store::{ResultStore, StoreError},
    utils::{
        export::{ExportError, ExportFormat, export_records_csv, export_records_json},
        format::format_bandwidth,
        log_file::{FileLogger, JsonLogOutcome, LogError},
    },
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error("Failed to write result log: {0}")]
    Log(#[from] LogError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Target files of the side log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

impl From<&AppConfig> for LogPaths {
    fn from(config: &AppConfig) -> Self {
        Self {
            json: config.json_log_path.clone(),
            csv: config.csv_log_path.clone(),
        }
    }
}

/// Result of one measurement cycle as reported to clients. Numbers are
/// rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
    pub is_fast: bool,
    pub summary: String,
    pub server_location: String,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {}: {}",
            "Server".bright_green().bold(),
            self.server_location.cyan()
        )?;
        writeln!(
            f,
            "  {}: {}",
            "Download".bright_green().bold(),
            format_bandwidth(self.download_speed).magenta()
        )?;
        writeln!(
            f,
            "  {}: {}",
            "Upload".bright_green().bold(),
            format_bandwidth(self.upload_speed).magenta()
        )?;
        writeln!(
            f,
            "  {}: {}",
            "Ping".bright_green().bold(),
            format!("{:.2} ms", self.ping).yellow()
        )?;

        let summary = if self.is_fast {
            self.summary.green()
        } else {
            self.summary.red()
        };
        writeln!(f, "  {}: {}", "Summary".bright_green().bold(), summary)
    }
}

/// Rendered export document.
#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    Json(String),
    Csv(Vec<u8>),
}

/// Transport independent core: measurement cycles, recent results and exports.
pub struct SpeedTestService {
    provider: Arc<dyn MeasurementProvider>,
    store: Arc<dyn ResultStore>,
    logger: FileLogger,
    log_paths: LogPaths,
}

impl SpeedTestService {
    pub fn new(
        provider: Arc<dyn MeasurementProvider>,
        store: Arc<dyn ResultStore>,
        log_paths: LogPaths,
    ) -> Self {
        Self {
            provider,
            store,
            logger: FileLogger,
            log_paths,
        }
    }

    /// Runs one measurement, then logs the analysis to both log files and
    /// stores the raw values. Nothing is written when the measurement fails.
    pub async fn check_speed(&self) -> Result<CheckOutcome, ServiceError> {
        let measurement = measure(self.provider.as_ref()).await?;

        let record = ResultRecord::new(
            measurement.download_speed,
            measurement.upload_speed,
            measurement.ping,
        );
        let analysis = Analyzer::from(&record).to_dict();

        match self.logger.log_to_json(&analysis, &self.log_paths.json)? {
            JsonLogOutcome::Created => {
                info!("Created JSON log {}", self.log_paths.json.display())
            }
            JsonLogOutcome::Appended { entries } | JsonLogOutcome::Recovered { entries } => {
                debug!("JSON log {} holds {entries} entries", self.log_paths.json.display())
            }
        }
        self.logger.log_to_csv(&analysis, &self.log_paths.csv)?;

        let server_location = measurement.server.location();
        let stored = self.store.create(NewRecord {
            download_speed: record.download_speed,
            upload_speed: record.upload_speed,
            ping: record.ping,
            server_name: measurement.server.name.clone(),
            server_location: server_location.clone(),
            server_country: measurement.server.country.clone(),
        })?;
        info!(
            "Stored speed test result {} (fast: {})",
            stored.id, analysis.is_fast
        );

        Ok(CheckOutcome {
            download_speed: analysis.download_speed,
            upload_speed: analysis.upload_speed,
            ping: analysis.ping,
            is_fast: analysis.is_fast,
            summary: analysis.summary,
            server_location,
        })
    }

    /// Most recent results for the home page.
    pub fn latest_results(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.store.latest(LATEST_RESULTS_LIMIT)
    }

    pub fn export(&self, format: ExportFormat) -> Result<Export, ServiceError> {
        let records = self.store.latest(EXPORT_RESULTS_LIMIT)?;

        Ok(match format {
            ExportFormat::Json => Export::Json(export_records_json(&records)?),
            ExportFormat::Csv => Export::Csv(export_records_csv(&records)?),
        })
    }
}
