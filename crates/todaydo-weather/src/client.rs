//! QWeather API client.
//!
//! A weather fetch is two calls, strictly in order:
//! 1. GeoAPI city lookup: location text or "lon,lat" to a location id
//! 2. Weather now: current conditions for that id
//!
//! The second call is never made when the first one fails.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use todaydo_core::{ReqwestErrorExt, Settings};
use tracing::instrument;

use crate::status::CODE_OK;
use crate::types::{kmh_to_ms, Phase, Weather, WeatherError};

const GEO_LOOKUP_PATH: &str = "/geo/v2/city/lookup";
const WEATHER_NOW_PATH: &str = "/v7/weather/now";
const RESPONSE_LANG: &str = "zh";

/// GeoAPI city lookup envelope
#[derive(Debug, Deserialize)]
struct CityLookupResponse {
    code: String,
    #[serde(default)]
    location: Vec<CityMatch>,
}

/// One ranked city lookup result
#[derive(Debug, Clone, Deserialize)]
pub struct CityMatch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
    #[serde(default)]
    pub adm1: String,
    #[serde(default)]
    pub adm2: String,
    #[serde(default)]
    pub country: String,
}

/// Weather now envelope
#[derive(Debug, Deserialize)]
struct WeatherNowResponse {
    code: String,
    now: Option<NowObservation>,
}

/// Raw observation; QWeather sends every number as a string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NowObservation {
    pub obs_time: String,
    pub temp: String,
    pub text: String,
    pub icon: String,
    pub humidity: String,
    /// km/h
    pub wind_speed: String,
}

impl NowObservation {
    /// Convert to display units for the given resolved place name.
    pub fn into_weather(self, location_name: &str) -> Result<Weather, WeatherError> {
        let wind_kmh = parse_number("windSpeed", &self.wind_speed)?;
        Ok(Weather {
            temp: parse_integer("temp", &self.temp)?,
            condition: self.text,
            icon: self.icon,
            location: location_name.to_string(),
            humidity: parse_integer("humidity", &self.humidity)?,
            wind_speed: kmh_to_ms(wind_kmh),
        })
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, WeatherError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WeatherError::InvalidField {
            field,
            value: value.to_string(),
        })
}

/// Integer part, truncated toward zero ("24.6" reads as 24).
fn parse_integer(field: &'static str, value: &str) -> Result<i32, WeatherError> {
    Ok(parse_number(field, value)?.trunc() as i32)
}

#[derive(Debug, Clone)]
pub struct QWeatherClient {
    client: reqwest::Client,
    base_url_override: Option<String>,
}

impl QWeatherClient {
    /// Client that talks to the host configured in the user settings.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url_override: None,
        }
    }

    /// Client pinned to a full base URL (alternate deployments, mock servers).
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url_override: Some(base_url.into()),
        }
    }

    fn base_url(&self, settings: &Settings) -> String {
        match &self.base_url_override {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", settings.qweather_host()),
        }
    }

    /// Resolve `location` and fetch its current conditions.
    #[instrument(skip(self, settings), level = "info")]
    pub async fn fetch(&self, settings: &Settings, location: &str) -> Result<Weather, WeatherError> {
        let Some(api_key) = settings.qweather_key() else {
            tracing::error!("QWeather API key not configured");
            return Err(WeatherError::NotConfigured);
        };
        let base = self.base_url(settings);

        let city = self.lookup_city(&base, api_key, location).await?;
        tracing::info!("Found location: {} (id {})", city.name, city.id);

        let now = self.weather_now(&base, api_key, &city.id).await?;
        let weather = now.into_weather(&city.name)?;
        tracing::info!("Weather fetched for {}", city.name);
        Ok(weather)
    }

    /// Geocode phase: first (provider-ranked) match for `location`.
    pub async fn lookup_city(
        &self,
        base: &str,
        api_key: &str,
        location: &str,
    ) -> Result<CityMatch, WeatherError> {
        let url = format!("{}{}", base, GEO_LOOKUP_PATH);
        let query = [
            ("location", location),
            ("key", api_key),
            ("lang", RESPONSE_LANG),
        ];

        let body: CityLookupResponse = self.get_json(Phase::Geocode, &url, &query).await?;
        tracing::debug!("City lookup response code: {}", body.code);

        if body.code != CODE_OK {
            return Err(WeatherError::Api {
                phase: Phase::Geocode,
                code: body.code,
            });
        }

        body.location
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))
    }

    /// Observation phase: current conditions for a location id.
    pub async fn weather_now(
        &self,
        base: &str,
        api_key: &str,
        location_id: &str,
    ) -> Result<NowObservation, WeatherError> {
        let url = format!("{}{}", base, WEATHER_NOW_PATH);
        let query = [
            ("location", location_id),
            ("key", api_key),
            ("lang", RESPONSE_LANG),
            ("unit", "m"),
        ];

        let body: WeatherNowResponse = self.get_json(Phase::Observation, &url, &query).await?;
        tracing::debug!("Weather now response code: {}", body.code);

        if body.code != CODE_OK {
            return Err(WeatherError::Api {
                phase: Phase::Observation,
                code: body.code,
            });
        }

        body.now.ok_or(WeatherError::NoData)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        phase: Phase,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::Network {
                phase,
                source: e.into_network_error(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Http {
                phase,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| WeatherError::Network {
            phase,
            source: e.into_network_error(),
        })?;
        serde_json::from_slice(&body).map_err(|source| WeatherError::Decode { phase, source })
    }
}
