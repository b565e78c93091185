//! Shared gateway context and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use agrovision_config::ClientConfig;
use agrovision_core::ClientError;
use agrovision_gateway::{
    AssistantGateway, HttpGateway, HttpWeatherGateway, RemoteGateway, WeatherGateway, WeatherQuery,
};
use anyhow::anyhow;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }

    /// Failure carrying a screen-level notice plus the classified error.
    pub(crate) fn with_notice(notice: &str, error: &ClientError) -> Self {
        if error.is_validation() {
            return Self::from(error.clone());
        }
        Self::failure(anyhow!("{notice} ({})", error.user_message()))
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Validation(message) => Self::Validation(message),
            other => Self::failure(anyhow!(other.user_message())),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) gateway: Arc<HttpGateway>,
    pub(crate) config: ClientConfig,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    pub(crate) fn new(config: ClientConfig, output: OutputFormat) -> CliResult<Self> {
        let gateway = HttpGateway::new(config.api_url.clone(), config.http_timeout)
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP gateway: {err}")))?;
        tracing::debug!(
            request_id = gateway.request_id(),
            api_url = %config.api_url,
            "gateway ready"
        );
        Ok(Self {
            gateway: Arc::new(gateway),
            config,
            output,
        })
    }

    pub(crate) fn remote(&self) -> Arc<dyn RemoteGateway> {
        Arc::clone(&self.gateway) as Arc<dyn RemoteGateway>
    }

    pub(crate) fn assistant(&self) -> Arc<dyn AssistantGateway> {
        Arc::clone(&self.gateway) as Arc<dyn AssistantGateway>
    }

    pub(crate) fn weather(&self) -> CliResult<Arc<dyn WeatherGateway>> {
        let api_key = self.config.weather.api_key.clone().ok_or_else(|| {
            CliError::validation(
                "weather API key missing; set --weather-api-key or AGROVISION_WEATHER_API_KEY",
            )
        })?;
        let query = WeatherQuery {
            endpoint: self.config.weather.endpoint.clone(),
            api_key,
            units: self.config.weather.units.as_str().to_string(),
        };
        let gateway = HttpWeatherGateway::new(query, self.config.http_timeout)
            .map_err(|err| CliError::failure(anyhow!("failed to build weather client: {err}")))?;
        Ok(Arc::new(gateway))
    }
}
