use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{constants::BITS_PER_MEGABIT, report::MeasurementError, utils::format::format_bandwidth};

pub use http::*;

mod http;

/// Server chosen for a measurement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub sponsor: String,
    pub country: String,
}

impl ServerInfo {
    /// Display location, "{name}, {country}".
    pub fn location(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// Source of measurement sessions. Implementations talk to an external
/// speed-test service; tests substitute deterministic fakes.
#[async_trait]
pub trait MeasurementProvider: Send + Sync {
    async fn start_session(&self) -> Result<Box<dyn MeasurementSession>, MeasurementError>;
}

/// One measurement run against a single server.
#[async_trait]
pub trait MeasurementSession: Send {
    /// Picks the server used by the rest of the session.
    async fn get_best_server(&mut self) -> Result<ServerInfo, MeasurementError>;

    /// Download speed in bits per second.
    async fn download(&mut self) -> Result<f64, MeasurementError>;

    /// Upload speed in bits per second.
    async fn upload(&mut self) -> Result<f64, MeasurementError>;

    /// Latency to the selected server in milliseconds.
    fn ping(&self) -> f64;
}

/// Completed measurement, speeds in Mbps.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub server: ServerInfo,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub ping: f64,
}

/// Runs one full session: server selection, download, upload.
///
/// No timeout is applied; the call lasts as long as the provider takes.
pub async fn measure(provider: &dyn MeasurementProvider) -> Result<Measurement, MeasurementError> {
    let mut session = provider.start_session().await?;

    let server = session.get_best_server().await?;
    debug!("Selected server {} ({})", server.location(), server.sponsor);

    let download_speed = session.download().await? / BITS_PER_MEGABIT;
    let upload_speed = session.upload().await? / BITS_PER_MEGABIT;
    let ping = session.ping();

    info!(
        "Measured download {}, upload {}, ping {:.2}ms against {}",
        format_bandwidth(download_speed),
        format_bandwidth(upload_speed),
        ping,
        server.location()
    );

    Ok(Measurement {
        server,
        download_speed,
        upload_speed,
        ping,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::FakeProvider;
    use super::*;

    #[tokio::test]
    async fn test_measure_converts_to_mbps() {
        let provider = FakeProvider::returning(100_000_000.0, 50_000_000.0, 5.0);

        let measurement = measure(&provider).await.unwrap();

        assert_eq!(measurement.download_speed, 100.0);
        assert_eq!(measurement.upload_speed, 50.0);
        assert_eq!(measurement.ping, 5.0);
        assert_eq!(measurement.server.location(), "TestServer, TestCountry");
    }

    #[tokio::test]
    async fn test_measure_propagates_provider_failure() {
        let provider = FakeProvider::failing("Mocked error");

        let err = measure(&provider).await.unwrap_err();

        assert_eq!(err.to_string(), "Mocked error");
    }
}
