//! Fallback values applied when a setting is not provided.

/// Backend base URL used during local development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5050";
/// Per-request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Upper bound accepted for the per-request timeout.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;
/// Current-conditions endpoint of the weather provider.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Default log filter when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";
