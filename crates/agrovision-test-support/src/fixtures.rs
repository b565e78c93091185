//! Sample records and their wire payloads.

use agrovision_api_models::{
    BatchId, BatchRecord, BatchSummary, Identity, WeatherCondition, WeatherReadings,
    WeatherReport,
};
use chrono::NaiveDate;
use serde_json::{Value, json};

/// Identity used throughout the account tests.
#[must_use]
pub fn sample_identity() -> Identity {
    Identity {
        user_id: 1,
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: "x@y.com".to_string(),
        phone_number: "555".to_string(),
        location: None,
    }
}

/// Wire form of [`sample_identity`].
#[must_use]
pub fn sample_identity_json() -> Value {
    json!({
        "user_id": 1,
        "firstName": "A",
        "lastName": "B",
        "email": "x@y.com",
        "phoneNumber": "555",
        "location": null
    })
}

/// Batch record whose name encodes its id, so tests can tell fetches apart.
#[must_use]
pub fn sample_batch(id: u64) -> BatchRecord {
    BatchRecord {
        batch_id: BatchId(id),
        name: format!("Batch {id}"),
        kind: "microgreens".to_string(),
        substrate: "coco coir".to_string(),
        sowing_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
        expected_harvest_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        status: "Growing".to_string(),
    }
}

/// Wire form of [`sample_batch`].
#[must_use]
pub fn sample_batch_json(id: u64) -> Value {
    json!({
        "batch_id": id,
        "name": format!("Batch {id}"),
        "type": "microgreens",
        "substrate": "coco coir",
        "sowing_date": "2024-03-01",
        "expected_harvest_date": "2024-03-15",
        "status": "Growing"
    })
}

/// Summary of [`sample_batch`].
#[must_use]
pub fn sample_summary(id: u64) -> BatchSummary {
    BatchSummary::from(&sample_batch(id))
}

/// Clear-sky report for a named place.
#[must_use]
pub fn sample_weather(place: &str) -> WeatherReport {
    WeatherReport {
        name: Some(place.to_string()),
        main: WeatherReadings {
            temp: 21.0,
            humidity: 40.0,
        },
        weather: vec![WeatherCondition {
            main: "Clear".to_string(),
            description: "clear sky".to_string(),
        }],
    }
}
