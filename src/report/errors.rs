use thiserror::Error;

/// Failure reported by a measurement provider. The message is what the
/// HTTP layer hands back to the client.
#[derive(Debug, Error)]
pub enum MeasurementError {
    /// No configured server answered the latency probe
    #[error("No reachable measurement server ({0} tried)")]
    NoReachableServer(usize),
    /// Error related to data transfer
    #[error("Transfer failed: {0}")]
    TransferFailed(String),
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Custom error message
    #[error("{0}")]
    Unknown(String),
}
