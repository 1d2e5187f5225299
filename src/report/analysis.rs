use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    FAST_MAX_PING_MS, FAST_MIN_DOWNLOAD_MBPS, FAST_MIN_UPLOAD_MBPS, SUMMARY_FAST, SUMMARY_SLOW,
};
use crate::report::ResultRecord;
use crate::utils::format::round2;
use crate::utils::log_file::{FileLogger, JsonLogOutcome, LogError};

/// Binary classifier for a single measurement.
///
/// Inputs are taken as-is: zero and negative values are classified, not rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analyzer {
    /// Download speed in Mbps
    pub download_speed: f64,
    /// Upload speed in Mbps
    pub upload_speed: f64,
    /// Ping in milliseconds
    pub ping: f64,
}

/// Summary dictionary produced by [`Analyzer::to_dict`]. Field order is the
/// column order used by the CSV log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Utc>,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
    pub is_fast: bool,
    pub summary: String,
}

impl Analyzer {
    pub fn new(download_speed: f64, upload_speed: f64, ping: f64) -> Self {
        Self {
            download_speed,
            upload_speed,
            ping,
        }
    }

    pub fn is_fast(&self) -> bool {
        self.download_speed >= FAST_MIN_DOWNLOAD_MBPS
            && self.upload_speed >= FAST_MIN_UPLOAD_MBPS
            && self.ping <= FAST_MAX_PING_MS
    }

    pub fn summary(&self) -> &'static str {
        if self.is_fast() {
            SUMMARY_FAST
        } else {
            SUMMARY_SLOW
        }
    }

    /// Builds the analysis stamped with the current time.
    pub fn to_dict(&self) -> AnalysisResult {
        self.analyze_at(Utc::now())
    }

    pub fn analyze_at(&self, timestamp: DateTime<Utc>) -> AnalysisResult {
        AnalysisResult {
            timestamp,
            download_speed: round2(self.download_speed),
            upload_speed: round2(self.upload_speed),
            ping: round2(self.ping),
            is_fast: self.is_fast(),
            summary: self.summary().to_string(),
        }
    }

    /// Appends a fresh [`Analyzer::to_dict`] to the JSON log at `file_path`.
    pub fn export_to_json(&self, file_path: &Path) -> Result<JsonLogOutcome, LogError> {
        FileLogger.log_to_json(&self.to_dict(), file_path)
    }

    /// Appends a fresh [`Analyzer::to_dict`] as a row of the CSV log at `file_path`.
    pub fn export_to_csv(&self, file_path: &Path) -> Result<(), LogError> {
        FileLogger.log_to_csv(&self.to_dict(), file_path)
    }
}

impl From<&ResultRecord> for Analyzer {
    fn from(record: &ResultRecord) -> Self {
        Self::new(record.download_speed, record.upload_speed, record.ping)
    }
}
