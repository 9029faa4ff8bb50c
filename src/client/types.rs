//! Backend Response Types
//!
//! Wire types for the transit-load backend. Every payload is transient: it is
//! decoded, projected into the view, and dropped.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque backend identifier.
///
/// The backend emits integer ids, but nothing on the client side does
/// arithmetic with them, so they are carried as strings. Both JSON numbers
/// and JSON strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        stringish(deserializer).map(Id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Accept a JSON number or string as a `String`
fn stringish<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn opt_stringish<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// A transit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Id,
    #[serde(deserialize_with = "stringish")]
    pub number: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A physical stop where load is measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: Id,
    pub name: String,
}

/// Current load snapshot for a route/stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentLoad {
    #[serde(default)]
    pub route_id: Option<Id>,
    #[serde(default, deserialize_with = "opt_stringish")]
    pub route_number: Option<String>,
    #[serde(default)]
    pub stop_id: Option<Id>,
    #[serde(default)]
    pub stop_name: Option<String>,
    /// People counted at the stop
    #[serde(alias = "people_count")]
    pub current_load: u32,
    #[serde(default)]
    pub load_percentage: Option<f64>,
    /// `free`, `medium`, `full`, `crowded`; anything else is displayed verbatim
    pub load_status: String,
    #[serde(alias = "timestamp")]
    pub updated_at: String,
    #[serde(default, alias = "buses")]
    pub next_buses: Vec<BusObservation>,
}

/// A bus seen near the stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusObservation {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(alias = "vehicle_id", deserialize_with = "stringish")]
    pub vehicle_number: String,
    #[serde(default)]
    pub current_load: Option<u32>,
    #[serde(default)]
    pub load_percentage: Option<f64>,
    /// Detection confidence in `0.0..=1.0`
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub load_status: Option<String>,
    #[serde(default, alias = "detected_at")]
    pub detection_time: Option<String>,
}

/// One predicted value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(alias = "timestamp")]
    pub forecast_time: String,
    #[serde(alias = "predicted_people")]
    pub predicted_load: f64,
    #[serde(default)]
    pub confidence_interval_lower: Option<f64>,
    #[serde(default)]
    pub confidence_interval_upper: Option<f64>,
}

/// Response of `/analytics/load-statistics/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadStatistics {
    #[serde(default)]
    pub statistics: Vec<AnalyticsStatistic>,
    /// Explanation supplied by the backend when there is nothing to show
    #[serde(default)]
    pub message: Option<String>,
}

/// Hourly aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsStatistic {
    pub timestamp: String,
    #[serde(default)]
    pub avg_load: Option<f64>,
    #[serde(default)]
    pub total_people: Option<f64>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub avg_people: Option<f64>,
    #[serde(default)]
    pub max_people: Option<f64>,
    #[serde(default)]
    pub total_boarding: Option<f64>,
    #[serde(default)]
    pub total_alighting: Option<f64>,
}

impl AnalyticsStatistic {
    /// Average people per sample; derived from the total when the backend
    /// does not send it. A zero sample count is treated as one.
    pub fn average_people(&self) -> Option<f64> {
        self.avg_people.or_else(|| {
            self.total_people
                .map(|total| total / f64::from(self.count.unwrap_or(0).max(1)))
        })
    }
}

/// Response of `/analytics/peak-hours/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeakHours {
    #[serde(default)]
    pub peak_hours: Vec<PeakHourEntry>,
}

/// Averaged metrics for an hour of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHourEntry {
    pub hour: u8,
    #[serde(default)]
    pub average_load_percentage: f64,
    #[serde(default)]
    pub average_people_count: f64,
}

/// Response of `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// What a load, forecast, or analytics request is about.
///
/// `id` goes into the path. `stop_id` narrows a route-level request down to a
/// single stop and is only sent when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTarget {
    pub id: Id,
    pub stop_id: Option<Id>,
}

impl LoadTarget {
    pub fn route(route_id: Id, stop_id: Option<Id>) -> Self {
        Self {
            id: route_id,
            stop_id,
        }
    }

    pub fn stop(stop_id: Id) -> Self {
        Self {
            id: stop_id,
            stop_id: None,
        }
    }
}
