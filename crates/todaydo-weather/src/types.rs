use serde::{Deserialize, Serialize};
use todaydo_core::{NetworkError, StoreError};

/// Geographic location from a position source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub city_name: Option<String>,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            city_name: None,
        }
    }

    /// `"lon,lat"`, the form QWeather accepts as a location query.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

/// Current conditions as shown in the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Degrees Celsius
    pub temp: i32,
    pub condition: String,
    /// QWeather icon code
    pub icon: String,
    /// Canonical name from the geocode phase
    pub location: String,
    /// Relative humidity, percent
    pub humidity: i32,
    /// Meters per second, one decimal
    pub wind_speed: f64,
}

/// Persisted weather cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedWeather {
    pub data: Weather,
    /// Unix milliseconds
    pub fetched_at: i64,
    /// Exact location string the data was requested for
    pub location: String,
}

impl CachedWeather {
    /// Usable for `location` at `now_ms` given `ttl_ms`.
    pub fn is_fresh_for(&self, location: &str, now_ms: i64, ttl_ms: i64) -> bool {
        self.location == location && now_ms - self.fetched_at < ttl_ms
    }
}

/// Convert km/h to m/s, rounded to one decimal place.
pub fn kmh_to_ms(kmh: f64) -> f64 {
    (kmh / 3.6 * 10.0).round() / 10.0
}

/// Which upstream call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Geocode,
    Observation,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geocode => f.write_str("City lookup"),
            Self::Observation => f.write_str("Weather API"),
        }
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("IP lookup failed: {0}")]
    Network(#[from] NetworkError),
    #[error("IP lookup rejected: {0}")]
    Rejected(String),
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("QWeather API key is not configured")]
    NotConfigured,
    #[error("Location must not be empty")]
    EmptyLocation,
    #[error("{phase} returned code {code}")]
    Api { phase: Phase, code: String },
    #[error("{phase} HTTP error: {status}")]
    Http { phase: Phase, status: u16 },
    #[error("{phase} request failed: {source}")]
    Network {
        phase: Phase,
        #[source]
        source: NetworkError,
    },
    #[error("{phase} returned an unreadable body: {source}")]
    Decode {
        phase: Phase,
        #[source]
        source: serde_json::Error,
    },
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Response carried no weather data")]
    NoData,
    #[error("Invalid {field} in response: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}
