use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    report::StoredRecord,
    utils::format::{format_decimal, round2},
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Requested export format was neither `json` nor `csv`.
#[derive(Debug, Error)]
#[error("Invalid format")]
pub struct InvalidExportFormat(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = InvalidExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(InvalidExportFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

const CSV_HEADER: [&str; 7] = [
    "Timestamp",
    "Download (Mbps)",
    "Upload (Mbps)",
    "Ping (ms)",
    "Server Name",
    "Location",
    "Country",
];

/// Serializes records as a JSON array of plain field mappings.
pub fn export_records_json(records: &[StoredRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string(records)?)
}

/// Renders records as a CSV document with a human readable header. Numbers
/// are rounded to 2 decimals and written like the CSV log writes them.
pub fn export_records_csv(records: &[StoredRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(&[
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format_decimal(round2(record.download_speed)),
            format_decimal(round2(record.upload_speed)),
            format_decimal(round2(record.ping)),
            record.server_name.clone(),
            record.server_location.clone(),
            record.server_country.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::IO(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: u64, download_speed: f64) -> StoredRecord {
        StoredRecord {
            id,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            download_speed,
            upload_speed: 20.456,
            ping: 7.0,
            server_name: "Kyiv".to_string(),
            server_location: "Kyiv, Ukraine".to_string(),
            server_country: "Ukraine".to_string(),
        }
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.0, "xml");
        assert_eq!(err.to_string(), "Invalid format");
        assert!("JSON".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_records_csv() {
        let csv = export_records_csv(&[record(1, 99.999)]).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            [
                "Timestamp,Download (Mbps),Upload (Mbps),Ping (ms),Server Name,Location,Country",
                "2025-03-14 09:26:53,100.0,20.46,7.0,Kyiv,\"Kyiv, Ukraine\",Ukraine",
            ]
        );
    }

    #[test]
    fn test_export_numbers_match_csv_log() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_path = dir.path().join("log.csv");
        let analysis = crate::report::Analyzer::new(100.0, 20.456, 7.0)
            .analyze_at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap());
        crate::utils::log_file::FileLogger
            .log_to_csv(&analysis, &log_path)
            .unwrap();

        let log = std::fs::read_to_string(&log_path).unwrap();
        let log_row: Vec<&str> = log.lines().nth(1).unwrap().split(',').collect();
        let export = String::from_utf8(export_records_csv(&[record(1, 100.0)]).unwrap()).unwrap();
        let export_row: Vec<&str> = export.lines().nth(1).unwrap().split(',').collect();

        assert_eq!(&log_row[1..4], ["100.0", "20.46", "7.0"]);
        assert_eq!(&export_row[1..4], &log_row[1..4]);
    }

    #[test]
    fn test_export_records_json_keeps_order() {
        let json = export_records_json(&[record(2, 200.0), record(1, 100.0)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["download_speed"], 200.0);
        assert_eq!(value[1]["download_speed"], 100.0);
        assert_eq!(value[0]["server_location"], "Kyiv, Ukraine");
        assert_eq!(value[0]["id"], 2);
    }
}
