//! Typed client settings.
//!
//! # Design
//! - Pure data carriers; parsing and validation live in `loader.rs`.
//! - Secrets stay out of `Debug` output.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::ConfigError;

/// Effective configuration for one client process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the AgroVision backend.
    pub api_url: Url,
    /// Per-request timeout applied by the HTTP gateway.
    pub http_timeout: Duration,
    /// Weather provider settings.
    pub weather: WeatherConfig,
    /// Logging preferences.
    pub logging: LoggingSettings,
}

/// Weather provider settings.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    /// Current-conditions endpoint.
    pub endpoint: Url,
    /// Provider API key; weather lookups are refused when absent.
    pub api_key: Option<String>,
    /// Unit system requested from the provider.
    pub units: WeatherUnits,
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WeatherConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("units", &self.units)
            .finish()
    }
}

/// Unit systems understood by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherUnits {
    /// Celsius, metres per second.
    #[default]
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
    /// Kelvin, metres per second.
    Standard,
}

impl WeatherUnits {
    /// Query-string value sent to the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    /// Temperature suffix for rendering readings.
    #[must_use]
    pub const fn temperature_suffix(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }
}

impl FromStr for WeatherUnits {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            "standard" => Ok(Self::Standard),
            _ => Err(ConfigError::invalid(
                "weather units",
                Some(value),
                "expected metric, imperial or standard",
            )),
        }
    }
}

/// Logging preferences handed to the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format preference.
    pub format: LogFormatPreference,
}

/// Requested log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormatPreference {
    /// Let the telemetry crate pick based on the build profile.
    #[default]
    Infer,
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

impl FromStr for LogFormatPreference {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "infer" | "auto" => Ok(Self::Infer),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::invalid(
                "log format",
                Some(value),
                "expected json or pretty",
            )),
        }
    }
}
