pub const DEFAULT_HTTP_PORT: u16 = 8000;

pub const DEFAULT_JSON_LOG_PATH: &str = "speedtest_results.json";
pub const DEFAULT_CSV_LOG_PATH: &str = "speedtest_results.csv";
pub const DEFAULT_STORE_PATH: &str = "speedtest_store.json";

/// Minimum download speed (Mbps) for a connection to count as fast.
pub const FAST_MIN_DOWNLOAD_MBPS: f64 = 50.0;
/// Minimum upload speed (Mbps) for a connection to count as fast.
pub const FAST_MIN_UPLOAD_MBPS: f64 = 20.0;
/// Maximum ping (ms) for a connection to count as fast.
pub const FAST_MAX_PING_MS: f64 = 50.0;

pub const SUMMARY_FAST: &str = "Інтернет-з'єднання хороше.";
pub const SUMMARY_SLOW: &str = "Інтернет-з'єднання повільне або нестабільне.";

/// Number of records shown on the home page.
pub const LATEST_RESULTS_LIMIT: usize = 5;
/// Number of records included in an export.
pub const EXPORT_RESULTS_LIMIT: usize = 100;
pub const EXPORT_CSV_FILENAME: &str = "speedtest_results.csv";

pub const BITS_PER_MEGABIT: f64 = 1_000_000.0;

pub const DEFAULT_DOWNLOAD_SIZE: usize = 25 * 1024 * 1024; // 25MB
pub const DEFAULT_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_LATENCY_SAMPLES: usize = 5;
pub const DEFAULT_MEASUREMENT_SERVER_URL: &str = "http://localhost:8080";
