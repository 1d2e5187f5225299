use std::{
    fs,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{
    constants::{
        DEFAULT_CSV_LOG_PATH, DEFAULT_DOWNLOAD_SIZE, DEFAULT_HTTP_PORT, DEFAULT_JSON_LOG_PATH,
        DEFAULT_LATENCY_SAMPLES, DEFAULT_MEASUREMENT_SERVER_URL, DEFAULT_STORE_PATH,
        DEFAULT_UPLOAD_SIZE,
    },
    speed::ServerEntry,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Enable CORS headers
    pub enable_cors: bool,
    pub json_log_path: PathBuf,
    pub csv_log_path: PathBuf,
    /// Location of the result store
    pub store_path: PathBuf,
    pub measurement: MeasurementConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HTTP_PORT)),
            enable_cors: true,
            json_log_path: PathBuf::from(DEFAULT_JSON_LOG_PATH),
            csv_log_path: PathBuf::from(DEFAULT_CSV_LOG_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            measurement: MeasurementConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Candidate servers; the one with the lowest latency is used
    pub servers: Vec<ServerEntry>,
    /// Bytes requested per download test
    pub download_size: usize,
    /// Bytes sent per upload test
    pub upload_size: usize,
    /// Latency probes per candidate server
    pub latency_samples: usize,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            servers: vec![ServerEntry {
                name: "localhost".to_string(),
                sponsor: "Local".to_string(),
                country: "Local".to_string(),
                url: Url::parse(DEFAULT_MEASUREMENT_SERVER_URL)
                    .expect("default measurement server URL is valid"),
            }],
            download_size: DEFAULT_DOWNLOAD_SIZE,
            upload_size: DEFAULT_UPLOAD_SIZE,
            latency_samples: DEFAULT_LATENCY_SAMPLES,
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads the config file at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.port(), DEFAULT_HTTP_PORT);
        assert_eq!(config.json_log_path, PathBuf::from("speedtest_results.json"));
        assert_eq!(config.csv_log_path, PathBuf::from("speedtest_results.csv"));
        assert_eq!(config.measurement.servers.len(), 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
                json_log_path = "/var/log/speed.json"

                [measurement]
                latency_samples = 3

                [[measurement.servers]]
                name = "Kyiv"
                sponsor = "Example ISP"
                country = "Ukraine"
                url = "http://speed.example.net:8080"
            "#,
            Path::new("speedtest.toml"),
        )
        .unwrap();

        assert_eq!(config.json_log_path, PathBuf::from("/var/log/speed.json"));
        assert_eq!(config.csv_log_path, PathBuf::from(DEFAULT_CSV_LOG_PATH));
        assert_eq!(config.measurement.latency_samples, 3);
        assert_eq!(config.measurement.download_size, DEFAULT_DOWNLOAD_SIZE);
        assert_eq!(config.measurement.servers.len(), 1);
        assert_eq!(config.measurement.servers[0].name, "Kyiv");
        assert_eq!(
            config.measurement.servers[0].url.as_str(),
            "http://speed.example.net:8080/"
        );
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "bind_addr = 42").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/speedtest.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
