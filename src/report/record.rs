use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::format::round2;

/// A single speed measurement, timestamped when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    /// Download speed in Mbps
    pub download_speed: f64,
    /// Upload speed in Mbps
    pub upload_speed: f64,
    /// Round-trip latency in milliseconds
    pub ping: f64,
}

/// Loggable form of a [`ResultRecord`], numbers rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundedRecord {
    pub timestamp: DateTime<Utc>,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
}

impl ResultRecord {
    pub fn new(download_speed: f64, upload_speed: f64, ping: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            download_speed,
            upload_speed,
            ping,
        }
    }

    /// Keeps the creation timestamp and rounds the measured values.
    pub fn as_dict(&self) -> RoundedRecord {
        RoundedRecord {
            timestamp: self.timestamp,
            download_speed: round2(self.download_speed),
            upload_speed: round2(self.upload_speed),
            ping: round2(self.ping),
        }
    }
}

/// Row of the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
    pub server_name: String,
    /// "{name}, {country}" of the server the measurement ran against
    pub server_location: String,
    pub server_country: String,
}

/// Payload for [`crate::store::ResultStore::create`]. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
    pub server_name: String,
    pub server_location: String,
    pub server_country: String,
}

impl StoredRecord {
    pub fn from_new(id: u64, timestamp: DateTime<Utc>, record: NewRecord) -> Self {
        Self {
            id,
            timestamp,
            download_speed: record.download_speed,
            upload_speed: record.upload_speed,
            ping: record.ping,
            server_name: record.server_name,
            server_location: record.server_location,
            server_country: record.server_country,
        }
    }
}
