//! Weather for Today Do
//!
//! Current conditions from QWeather (city lookup, then observation), with a
//! 30-minute cache in the key-value store and automatic location detection.

pub mod cache;
pub mod client;
pub mod location;
pub mod provider;
pub mod status;
pub mod types;

pub use cache::{WeatherCache, WEATHER_TTL_MS};
pub use client::{CityMatch, NowObservation, QWeatherClient};
pub use location::{LocationResolver, NoPositionSource, PositionOptions, PositionSource};
pub use provider::{WeatherProvider, WeatherState};
pub use status::{known_status_message, status_message};
pub use types::*;
