//! Current-conditions client for the weather provider.

use std::fmt;
use std::time::Duration;

use agrovision_api_models::WeatherReport;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::contract::WeatherGateway;
use crate::error::{GatewayError, GatewayResult, classify_response, classify_transport};

/// Provider endpoint plus the fixed query parameters sent with every lookup.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    /// Current-conditions endpoint.
    pub endpoint: Url,
    /// Provider API key sent as `appid`.
    pub api_key: String,
    /// Unit system sent as `units`.
    pub units: String,
}

impl fmt::Debug for WeatherQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WeatherQuery")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .finish()
    }
}

impl WeatherQuery {
    fn url_for(&self, latitude: f64, longitude: f64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("appid", &self.api_key)
            .append_pair("units", &self.units);
        url
    }
}

/// HTTP client for the weather provider.
#[derive(Debug, Clone)]
pub struct HttpWeatherGateway {
    client: Client,
    query: WeatherQuery,
}

impl HttpWeatherGateway {
    /// Build a client with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unknown`] when the HTTP client cannot be built.
    pub fn new(query: WeatherQuery, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::unknown(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, query })
    }
}

#[async_trait]
impl WeatherGateway for HttpWeatherGateway {
    async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> GatewayResult<WeatherReport> {
        let url = self.query.url_for(latitude, longitude);
        tracing::debug!(latitude, longitude, "requesting current conditions");

        let response = self.client.get(url).send().await.map_err(|err| {
            let error = classify_transport(&err);
            tracing::warn!(error = %error, "weather request failed");
            error
        })?;
        if !response.status().is_success() {
            let error = classify_response(response).await;
            tracing::warn!(status = error.status(), "weather request rejected");
            return Err(error);
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| classify_transport(&err))?;
        serde_json::from_slice(&body).map_err(|err| GatewayError::decode(&err))
    }
}
