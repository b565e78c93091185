//! Environment-backed configuration loading.
//!
//! Every setting is optional; blank values count as unset. Lookups go through
//! an injectable function so tests never touch the process environment.

use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_WEATHER_URL,
    MAX_HTTP_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    ClientConfig, LogFormatPreference, LoggingSettings, WeatherConfig, WeatherUnits,
};

/// Prefix shared by every environment variable read by the loader.
pub const ENV_PREFIX: &str = "AGROVISION_";

const API_URL: &str = "AGROVISION_API_URL";
const HTTP_TIMEOUT_SECS: &str = "AGROVISION_HTTP_TIMEOUT_SECS";
const WEATHER_URL: &str = "AGROVISION_WEATHER_URL";
const WEATHER_API_KEY: &str = "AGROVISION_WEATHER_API_KEY";
const WEATHER_UNITS: &str = "AGROVISION_WEATHER_UNITS";
const LOG_LEVEL: &str = "AGROVISION_LOG_LEVEL";
const LOG_FORMAT: &str = "AGROVISION_LOG_FORMAT";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when a variable is set to an invalid value.
pub fn load_from_env() -> ConfigResult<ClientConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through `lookup`, which maps variable names to values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when a variable is set to an invalid value.
pub fn load_from_lookup<F>(lookup: F) -> ConfigResult<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let api_url = parse_http_url(API_URL, read(API_URL).as_deref().unwrap_or(DEFAULT_API_URL))?;
    let http_timeout = read(HTTP_TIMEOUT_SECS)
        .map_or(Ok(DEFAULT_HTTP_TIMEOUT_SECS), |raw| parse_timeout_secs(&raw))
        .map(Duration::from_secs)?;

    let endpoint = parse_http_url(
        WEATHER_URL,
        read(WEATHER_URL).as_deref().unwrap_or(DEFAULT_WEATHER_URL),
    )?;
    let units = read(WEATHER_UNITS).map_or(Ok(WeatherUnits::default()), |raw| {
        raw.parse::<WeatherUnits>().map_err(|_| {
            ConfigError::invalid(
                WEATHER_UNITS,
                Some(&raw),
                "expected metric, imperial or standard",
            )
        })
    })?;

    let format = read(LOG_FORMAT).map_or(Ok(LogFormatPreference::default()), |raw| {
        raw.parse::<LogFormatPreference>()
            .map_err(|_| ConfigError::invalid(LOG_FORMAT, Some(&raw), "expected json or pretty"))
    })?;

    let config = ClientConfig {
        api_url,
        http_timeout,
        weather: WeatherConfig {
            endpoint,
            api_key: read(WEATHER_API_KEY),
            units,
        },
        logging: LoggingSettings {
            level: read(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format,
        },
    };
    tracing::debug!(
        api_url = %config.api_url,
        timeout_secs = config.http_timeout.as_secs(),
        "client configuration loaded"
    );
    Ok(config)
}

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an absolute web URL.
pub fn parse_http_url(field: &str, raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|_| ConfigError::invalid(field, Some(raw), "not a URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            Some(raw),
            "scheme must be http or https",
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::invalid(field, Some(raw), "host is missing"));
    }
    Ok(url)
}

/// Parse a request timeout in whole seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer in range.
pub fn parse_timeout_secs(raw: &str) -> ConfigResult<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(HTTP_TIMEOUT_SECS, Some(raw), "must be an integer"))?;
    if !(1..=MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::invalid(
            HTTP_TIMEOUT_SECS,
            Some(raw),
            "must be between 1 and 300",
        ));
    }
    Ok(secs)
}
