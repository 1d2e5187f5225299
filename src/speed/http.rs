use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use rand::RngCore;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use url::Url;

use super::{MeasurementProvider, MeasurementSession, ServerInfo};
use crate::{config::MeasurementConfig, report::MeasurementError, utils::format::format_bytes};

/// Candidate measurement server, as listed in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    pub sponsor: String,
    pub country: String,
    /// Base URL exposing `/latency`, `/download?size=N` and `/upload`
    pub url: Url,
}

impl ServerEntry {
    fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            sponsor: self.sponsor.clone(),
            country: self.country.clone(),
        }
    }
}

/// Measurement provider speaking plain HTTP to the configured servers.
pub struct HttpSpeedProvider {
    client: Client,
    config: MeasurementConfig,
}

impl HttpSpeedProvider {
    pub fn new(config: MeasurementConfig) -> Result<Self, MeasurementError> {
        Ok(Self::with_client(create_http_client()?, config))
    }

    pub fn with_client(client: Client, config: MeasurementConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl MeasurementProvider for HttpSpeedProvider {
    async fn start_session(&self) -> Result<Box<dyn MeasurementSession>, MeasurementError> {
        Ok(Box::new(HttpSpeedSession {
            client: self.client.clone(),
            config: self.config.clone(),
            selected: None,
        }))
    }
}

struct SelectedServer {
    entry: ServerEntry,
    latency_ms: f64,
}

struct HttpSpeedSession {
    client: Client,
    config: MeasurementConfig,
    selected: Option<SelectedServer>,
}

impl HttpSpeedSession {
    /// Base URL of the selected server, selecting one first if needed.
    async fn server_url(&mut self) -> Result<Url, MeasurementError> {
        if self.selected.is_none() {
            self.get_best_server().await?;
        }

        self.selected
            .as_ref()
            .map(|selected| selected.entry.url.clone())
            .ok_or(MeasurementError::NoReachableServer(self.config.servers.len()))
    }
}

#[async_trait]
impl MeasurementSession for HttpSpeedSession {
    async fn get_best_server(&mut self) -> Result<ServerInfo, MeasurementError> {
        let mut best: Option<SelectedServer> = None;

        for entry in &self.config.servers {
            match measure_latency(&self.client, &entry.url, self.config.latency_samples).await {
                Ok(latency_ms) => {
                    debug!("Server {} latency {latency_ms:.2}ms", entry.url);
                    if best.as_ref().is_none_or(|b| latency_ms < b.latency_ms) {
                        best = Some(SelectedServer {
                            entry: entry.clone(),
                            latency_ms,
                        });
                    }
                }
                Err(e) => warn!("Skipping unreachable server {}: {e}", entry.url),
            }
        }

        let best = best.ok_or(MeasurementError::NoReachableServer(self.config.servers.len()))?;
        let info = best.entry.info();
        self.selected = Some(best);
        Ok(info)
    }

    async fn download(&mut self) -> Result<f64, MeasurementError> {
        let mut url = endpoint(&self.server_url().await?, "download")?;
        url.query_pairs_mut()
            .append_pair("size", &self.config.download_size.to_string());

        let start = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut total_bytes = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            total_bytes += chunk?.len() as u64;
        }
        let elapsed = start.elapsed();

        trace!(
            "Downloaded {} in {:.2}s",
            format_bytes(total_bytes),
            elapsed.as_secs_f64()
        );
        bits_per_second(total_bytes, elapsed)
    }

    async fn upload(&mut self) -> Result<f64, MeasurementError> {
        let url = endpoint(&self.server_url().await?, "upload")?;

        let mut payload = vec![0u8; self.config.upload_size];
        rand::rng().fill_bytes(&mut payload);
        let payload = Bytes::from(payload);
        let total_bytes = payload.len() as u64;

        let start = Instant::now();
        self.client
            .post(url)
            .header("Content-Type", "application/octet-stream")
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        let elapsed = start.elapsed();

        trace!(
            "Uploaded {} in {:.2}s",
            format_bytes(total_bytes),
            elapsed.as_secs_f64()
        );
        bits_per_second(total_bytes, elapsed)
    }

    fn ping(&self) -> f64 {
        self.selected
            .as_ref()
            .map_or(0.0, |selected| selected.latency_ms)
    }
}

fn create_http_client() -> Result<Client, MeasurementError> {
    // Only the connect phase is bounded; transfers run as long as they take
    let client = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(30))
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

/// Mean round-trip time of `samples` GET requests to `{base}/latency`, in ms.
async fn measure_latency(
    client: &Client,
    base: &Url,
    samples: usize,
) -> Result<f64, MeasurementError> {
    let url = endpoint(base, "latency")?;
    let mut rtts = Vec::with_capacity(samples.max(1));

    for _ in 0..samples.max(1) {
        let start = Instant::now();
        client.get(url.clone()).send().await?.error_for_status()?;
        rtts.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    Ok(statistical::mean(&rtts))
}

/// Joins `path` onto `base`, treating `base` as a directory.
fn endpoint(base: &Url, path: &str) -> Result<Url, MeasurementError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path)?)
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> Result<f64, MeasurementError> {
    if bytes == 0 || elapsed.is_zero() {
        return Err(MeasurementError::TransferFailed(
            "no data transferred".to_string(),
        ));
    }
    Ok(bytes as f64 * 8.0 / elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::Query,
        routing::{get, post},
    };

    #[derive(Deserialize)]
    struct DownloadQuery {
        size: usize,
    }

    async fn spawn_speed_server() -> Url {
        let app = Router::new()
            .route("/latency", get(|| async { "OK" }))
            .route(
                "/download",
                get(|Query(query): Query<DownloadQuery>| async move { vec![0u8; query.size] }),
            )
            .route("/upload", post(|body: Bytes| async move { body.len().to_string() }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn entry(name: &str, url: Url) -> ServerEntry {
        ServerEntry {
            name: name.to_string(),
            sponsor: "Sponsor".to_string(),
            country: "Ukraine".to_string(),
            url,
        }
    }

    fn provider(servers: Vec<ServerEntry>) -> HttpSpeedProvider {
        let config = MeasurementConfig {
            servers,
            download_size: 256 * 1024,
            upload_size: 64 * 1024,
            latency_samples: 2,
        };
        let client = Client::builder().no_proxy().build().unwrap();
        HttpSpeedProvider::with_client(client, config)
    }

    #[test]
    fn test_endpoint_joins_as_directory() {
        let base = Url::parse("http://speed.example:8080").unwrap();
        assert_eq!(
            endpoint(&base, "latency").unwrap().as_str(),
            "http://speed.example:8080/latency"
        );

        let base = Url::parse("http://speed.example/api").unwrap();
        assert_eq!(
            endpoint(&base, "download").unwrap().as_str(),
            "http://speed.example/api/download"
        );
    }

    #[test]
    fn test_bits_per_second() {
        let bps = bits_per_second(1_000_000, Duration::from_secs(2)).unwrap();
        assert_eq!(bps, 4_000_000.0);
        assert!(bits_per_second(0, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_no_servers_configured() {
        let mut session = provider(Vec::new()).start_session().await.unwrap();

        let err = session.get_best_server().await.unwrap_err();
        assert!(matches!(err, MeasurementError::NoReachableServer(0)));
        assert_eq!(session.ping(), 0.0);
    }

    #[tokio::test]
    async fn test_session_against_local_server() {
        let url = spawn_speed_server().await;
        // Port 9 on loopback is not listening, so the first candidate is skipped
        let unreachable = Url::parse("http://127.0.0.1:9").unwrap();
        let provider = provider(vec![entry("Down", unreachable), entry("Kyiv", url)]);

        let measurement = crate::speed::measure(&provider).await.unwrap();

        assert_eq!(measurement.server.name, "Kyiv");
        assert!(measurement.download_speed > 0.0);
        assert!(measurement.upload_speed > 0.0);
        assert!(measurement.ping > 0.0);
    }

    #[tokio::test]
    async fn test_download_selects_server_on_demand() {
        let url = spawn_speed_server().await;
        let mut session = provider(vec![entry("Kyiv", url)])
            .start_session()
            .await
            .unwrap();

        assert!(session.download().await.unwrap() > 0.0);
        assert!(session.ping() > 0.0);
    }
}
