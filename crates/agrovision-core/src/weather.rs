//! Weather view model: conditions at the device position or a picked spot.
//!
//! Both entry points fetch through the same generation counter as the batch
//! views, so a slow answer for an earlier position never replaces a newer one.

use std::sync::Arc;

use agrovision_api_models::WeatherReport;
use agrovision_events::{Snapshot, SnapshotBus, SnapshotStream};
use agrovision_gateway::WeatherGateway;

use crate::error::{ClientError, ClientResult};
use crate::load::{LoadOutcome, LoadTicket};

/// Reported when location access was refused.
pub const LOCATION_PERMISSION_MESSAGE: &str = "Permission to access location is required!";
/// Reported when a refresh is asked for before any device position is known.
pub const NO_POSITION_MESSAGE: &str = "Current location is not known yet.";
/// Reported when the lookup failed.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch location or weather data.";
/// Reported for coordinates outside the valid range.
pub const INVALID_COORDINATES_MESSAGE: &str =
    "Latitude must be within -90..90 and longitude within -180..180.";

/// Validated geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate a position.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when either value is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> ClientResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClientError::validation(INVALID_COORDINATES_MESSAGE));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// Answer from the device location service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFix {
    /// A position was obtained.
    Granted(Coordinates),
    /// Location access was refused.
    PermissionDenied,
}

/// Published weather state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    /// Last known device position.
    pub device: Option<Coordinates>,
    /// Position picked on the map, if any.
    pub selected: Option<Coordinates>,
    /// Conditions from the latest applied fetch.
    pub report: Option<WeatherReport>,
    /// Whether a fetch is pending.
    pub loading: bool,
    /// Error from the latest fetch.
    pub error: Option<ClientError>,
    generation: u64,
}

impl WeatherState {
    /// Banner text for the current error.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.error.as_ref().map(|error| {
            if error.is_validation() {
                error.user_message()
            } else {
                FETCH_FAILED_MESSAGE.to_string()
            }
        })
    }
}

/// View model behind the weather screen.
#[derive(Clone)]
pub struct WeatherModel {
    gateway: Arc<dyn WeatherGateway>,
    state: SnapshotBus<WeatherState>,
}

impl WeatherModel {
    /// Empty model.
    #[must_use]
    pub fn new(gateway: Arc<dyn WeatherGateway>) -> Self {
        Self {
            gateway,
            state: SnapshotBus::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Snapshot<WeatherState> {
        self.state.snapshot()
    }

    /// Subscribe to changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<WeatherState> {
        self.state.subscribe()
    }

    /// Fetch conditions at the device position.
    pub async fn load(&self, fix: LocationFix) -> LoadOutcome {
        match fix {
            LocationFix::Granted(coordinates) => {
                self.state.publish(|state| state.device = Some(coordinates));
                self.fetch(coordinates).await
            }
            LocationFix::PermissionDenied => self.reject(LOCATION_PERMISSION_MESSAGE),
        }
    }

    /// Fetch conditions at a position picked on the map.
    pub async fn select_location(&self, coordinates: Coordinates) -> LoadOutcome {
        self.state.publish(|state| state.selected = Some(coordinates));
        self.fetch(coordinates).await
    }

    /// Fetch again at the last known device position.
    pub async fn refresh(&self) -> LoadOutcome {
        let device = self.state.snapshot().device;
        match device {
            Some(coordinates) => {
                self.state.publish(|state| state.selected = None);
                self.fetch(coordinates).await
            }
            None => self.reject(NO_POSITION_MESSAGE),
        }
    }

    fn reject(&self, message: &str) -> LoadOutcome {
        let error = ClientError::validation(message);
        self.state.publish(|state| {
            state.generation += 1;
            state.loading = false;
            state.report = None;
            state.error = Some(error.clone());
        });
        LoadOutcome::Failed(error)
    }

    async fn fetch(&self, coordinates: Coordinates) -> LoadOutcome {
        let mut ticket = LoadTicket { generation: 0 };
        self.state.publish(|state| {
            state.generation += 1;
            state.loading = true;
            state.error = None;
            ticket.generation = state.generation;
        });

        let result = self
            .gateway
            .current_conditions(coordinates.latitude(), coordinates.longitude())
            .await;

        let mut outcome = LoadOutcome::Discarded;
        self.state.publish_if(|state| {
            if state.generation != ticket.generation {
                return false;
            }
            state.loading = false;
            match result {
                Ok(report) => {
                    state.report = Some(report);
                    outcome = LoadOutcome::Applied;
                }
                Err(err) => {
                    let error = ClientError::from(err);
                    state.report = None;
                    state.error = Some(error.clone());
                    outcome = LoadOutcome::Failed(error);
                }
            }
            true
        });
        if let LoadOutcome::Failed(error) = &outcome {
            tracing::warn!(error = %error, "weather lookup failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrovision_gateway::GatewayError;
    use agrovision_test_support::fixtures::sample_weather;
    use agrovision_test_support::mocks::{GatewayCall, ScriptedGateway};

    fn model_with(gateway: &Arc<ScriptedGateway>) -> WeatherModel {
        WeatherModel::new(Arc::clone(gateway) as Arc<dyn WeatherGateway>)
    }

    fn coords(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates::new(latitude, longitude).expect("valid coordinates")
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, 181.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[tokio::test]
    async fn device_fix_fetches_conditions() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_conditions(Ok(sample_weather("Kyiv")));
        let model = model_with(&gateway);

        let outcome = model.load(LocationFix::Granted(coords(50.45, 30.52))).await;
        assert_eq!(outcome, LoadOutcome::Applied);
        let state = model.state();
        assert_eq!(state.report, Some(sample_weather("Kyiv")));
        assert_eq!(state.device, Some(coords(50.45, 30.52)));
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::CurrentConditions(50.45, 30.52)]
        );
    }

    #[tokio::test]
    async fn denied_permission_is_a_validation_error_without_request() {
        let gateway = Arc::new(ScriptedGateway::new());
        let model = model_with(&gateway);

        let outcome = model.load(LocationFix::PermissionDenied).await;
        assert_eq!(
            outcome,
            LoadOutcome::Failed(ClientError::validation(LOCATION_PERMISSION_MESSAGE))
        );
        assert_eq!(
            model.state().notice().as_deref(),
            Some(LOCATION_PERMISSION_MESSAGE)
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_clears_report() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_conditions(Ok(sample_weather("Kyiv")));
        gateway.push_conditions(Err(GatewayError::Server {
            status: 401,
            message: Some("Invalid API key".to_string()),
        }));
        let model = model_with(&gateway);
        model.load(LocationFix::Granted(coords(50.45, 30.52))).await;

        let outcome = model.refresh().await;
        assert!(matches!(outcome, LoadOutcome::Failed(ClientError::Server { .. })));
        let state = model.state();
        assert_eq!(state.report, None);
        assert_eq!(state.notice().as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn newer_selection_wins_over_slow_device_fetch() {
        let gateway = Arc::new(ScriptedGateway::new());
        let release_device = gateway.hold_conditions();
        gateway.push_conditions(Ok(sample_weather("Picked")));
        let model = model_with(&gateway);

        let device = tokio::spawn({
            let model = model.clone();
            async move { model.load(LocationFix::Granted(coords(1.0, 1.0))).await }
        });
        let mut stream = model.subscribe();
        while !stream.current().loading {
            stream.next().await.expect("model alive");
        }

        assert_eq!(
            model.select_location(coords(2.0, 2.0)).await,
            LoadOutcome::Applied
        );
        release_device
            .send(Ok(sample_weather("Device")))
            .expect("device fetch waiting");
        assert_eq!(device.await.expect("task"), LoadOutcome::Discarded);
        assert_eq!(model.state().report, Some(sample_weather("Picked")));
    }

    #[tokio::test]
    async fn refresh_without_device_fix_reports_unknown_position() {
        let gateway = Arc::new(ScriptedGateway::new());
        let model = model_with(&gateway);
        let outcome = model.refresh().await;
        assert_eq!(
            outcome,
            LoadOutcome::Failed(ClientError::validation(NO_POSITION_MESSAGE))
        );
        let state = model.state();
        assert!(!state.loading);
        assert_eq!(state.notice().as_deref(), Some(NO_POSITION_MESSAGE));
        assert_eq!(gateway.call_count(), 0);
    }
}
