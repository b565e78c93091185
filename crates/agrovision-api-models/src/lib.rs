#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the AgroVision backend.
//!
//! These types are used by the gateway for request/response encoding and by the
//! view models as their read-only cached copies. Field names follow the backend's
//! wire format (a mix of `camelCase` user fields and `snake_case` batch fields);
//! the Rust side always uses `snake_case`.

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric identifier assigned to a user account by the backend.
pub type UserId = u64;

/// Authenticated user profile as returned by login, registration and lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Backend-assigned account identifier.
    pub user_id: UserId,
    #[serde(rename = "firstName")]
    /// Given name.
    pub first_name: String,
    #[serde(rename = "lastName")]
    /// Family name.
    pub last_name: String,
    /// Account email address.
    pub email: String,
    #[serde(rename = "phoneNumber")]
    /// Contact phone number.
    pub phone_number: String,
    #[serde(default)]
    /// Free-form location, `null` when the user never set one.
    pub location: Option<String>,
}

impl Identity {
    /// Merge the provided fields into this identity, leaving unspecified fields untouched.
    pub fn apply_patch(&mut self, patch: IdentityPatch) {
        let IdentityPatch {
            user_id,
            first_name,
            last_name,
            email,
            phone_number,
            location,
        } = patch;
        if let Some(user_id) = user_id {
            self.user_id = user_id;
        }
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone_number) = phone_number {
            self.phone_number = phone_number;
        }
        if let Some(location) = location {
            self.location = location;
        }
    }

    /// Display name combining first and last name.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Partial identity update; `None` means "keep the current value".
///
/// `location` is doubly optional so a patch can explicitly clear it
/// (`Some(None)`) as well as leave it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    /// Replacement account identifier.
    pub user_id: Option<UserId>,
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement phone number.
    pub phone_number: Option<String>,
    /// Replacement location, including an explicit clear.
    pub location: Option<Option<String>>,
}

impl IdentityPatch {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.location.is_none()
    }
}

/// Credentials submitted to `POST /auth/login`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email address.
    pub email: String,
    /// Plain-text password; never logged.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account details submitted to `POST /auth/registration`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Account email address.
    pub email: String,
    /// Plain-text password; never logged.
    pub password: String,
    #[serde(rename = "firstName")]
    /// Given name.
    pub first_name: String,
    #[serde(rename = "lastName")]
    /// Family name.
    pub last_name: String,
    #[serde(rename = "phoneNumber")]
    /// Contact phone number.
    pub phone_number: String,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Identifier of a cultivation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl Display for BatchId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<u64> for BatchId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for BatchId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<u64>().map(Self)
    }
}

/// Authoritative description of a cultivation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchRecord {
    #[serde(alias = "id")]
    /// Batch identifier.
    pub batch_id: BatchId,
    /// Display name.
    pub name: String,
    #[serde(rename = "type")]
    /// Crop type, e.g. `Microgreens`.
    pub kind: String,
    /// Growing substrate, e.g. `Coconut Coir`.
    pub substrate: String,
    #[serde(with = "wire_date")]
    /// Date the batch was sown.
    pub sowing_date: NaiveDate,
    #[serde(default, with = "wire_date_opt")]
    /// Expected harvest date when the backend has computed one.
    pub expected_harvest_date: Option<NaiveDate>,
    /// Status label computed by the backend; opaque to the client.
    pub status: String,
}

/// Condensed batch entry returned by `GET /batches`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSummary {
    #[serde(alias = "id")]
    /// Batch identifier.
    pub batch_id: BatchId,
    /// Display name.
    pub name: String,
    #[serde(rename = "type")]
    /// Crop type.
    pub kind: String,
    /// Status label computed by the backend.
    pub status: String,
}

impl From<&BatchRecord> for BatchSummary {
    fn from(record: &BatchRecord) -> Self {
        Self {
            batch_id: record.batch_id,
            name: record.name.clone(),
            kind: record.kind.clone(),
            status: record.status.clone(),
        }
    }
}

/// Payload submitted to `POST /batches`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchCreateRequest {
    /// Display name.
    pub name: String,
    #[serde(rename = "type")]
    /// Crop type.
    pub kind: String,
    #[serde(with = "wire_date")]
    /// Date the batch was sown.
    pub sowing_date: NaiveDate,
    /// Growing substrate.
    pub substrate: String,
}

/// Error body returned by the backend on rejected requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human-readable rejection reason.
    pub message: Option<String>,
}

/// Question submitted to `POST /ai/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantQuestion {
    /// Free-text question.
    pub question: String,
}

/// Answer returned by `POST /ai/ask`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantAnswer {
    #[serde(default)]
    /// Generated answer; absent when the assistant produced nothing.
    pub response: Option<String>,
}

/// Subset of the weather provider's current-conditions document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    #[serde(default)]
    /// Nearest named place, when the provider resolves one.
    pub name: Option<String>,
    /// Temperature and humidity readings.
    pub main: WeatherReadings,
    #[serde(default)]
    /// Condition descriptors, most significant first.
    pub weather: Vec<WeatherCondition>,
}

impl WeatherReport {
    /// Description of the most significant condition, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.weather
            .first()
            .map(|condition| condition.description.as_str())
    }
}

/// Numeric readings within a [`WeatherReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReadings {
    /// Temperature in the requested unit system.
    pub temp: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// Single condition descriptor within a [`WeatherReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherCondition {
    /// Condition group, e.g. `Rain`.
    pub main: String,
    /// Human-readable condition, e.g. `light rain`.
    pub description: String,
}

/// Parse a backend date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
#[must_use]
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, WIRE_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(crate) fn serialize<S: Serializer>(
        date: &NaiveDate,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(super::WIRE_DATE_FORMAT))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wire_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
    }
}

mod wire_date_opt {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[allow(clippy::ref_option)]
    pub(crate) fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(super::WIRE_DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_wire_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'"))),
        }
    }
}
