//! Location detection for the weather widget.
//!
//! [`LocationResolver::resolve`] walks an ordered chain and always produces
//! a `"lon,lat"` string:
//! 1. device position from a [`PositionSource`]
//! 2. IP geolocation
//! 3. the configured fallback coordinate

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use todaydo_core::config::DEFAULT_FALLBACK_LOCATION;
use todaydo_core::{AppConfig, Clock, ReqwestErrorExt, SystemClock};

use crate::types::{Location, LocationError};

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// Options passed to the device position source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    /// Network-based positioning is enough for weather
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A fix younger than this is reused without asking the source again
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

/// Device positioning (OS location service, GPS, ...).
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Whether positioning can be attempted at all on this host.
    fn is_available(&self) -> bool;

    async fn current_position(&self, options: &PositionOptions)
        -> Result<Location, LocationError>;
}

/// Source for hosts without a location service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPositionSource;

#[async_trait]
impl PositionSource for NoPositionSource {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Location, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Subset of the ipapi.co response
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
}

pub struct LocationResolver {
    source: Arc<dyn PositionSource>,
    http: reqwest::Client,
    ip_lookup_url: String,
    options: PositionOptions,
    fallback: String,
    clock: Arc<dyn Clock>,
    /// Last device fix and when it was taken (Unix ms)
    last_fix: Mutex<Option<(Location, i64)>>,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("ip_lookup_url", &self.ip_lookup_url)
            .field("options", &self.options)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl LocationResolver {
    /// Resolver with no device positioning and the default endpoints.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            source: Arc::new(NoPositionSource),
            http,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            options: PositionOptions::default(),
            fallback: DEFAULT_FALLBACK_LOCATION.to_string(),
            clock: Arc::new(SystemClock),
            last_fix: Mutex::new(None),
        }
    }

    /// Resolver using the endpoint and timing options from the app config.
    pub fn from_config(http: reqwest::Client, config: &AppConfig) -> Self {
        let options = PositionOptions {
            timeout: Duration::from_secs(config.location.geolocation_timeout_secs),
            maximum_age: Duration::from_secs(config.location.position_max_age_secs),
            ..PositionOptions::default()
        };
        Self::new(http)
            .with_ip_lookup_url(config.endpoints.ip_lookup_url.clone())
            .with_fallback(config.location.fallback.clone())
            .with_options(options)
    }

    pub fn with_position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_ip_lookup_url(mut self, url: impl Into<String>) -> Self {
        self.ip_lookup_url = url.into();
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Best available `"lon,lat"`. Never fails.
    pub async fn resolve(&self) -> String {
        tracing::info!("Detecting location");

        match self.device_position().await {
            Ok(location) => {
                let query = location.to_query();
                tracing::info!("Using device location: {}", query);
                return query;
            }
            Err(e) => tracing::warn!("Device location failed: {}", e),
        }

        match self.ip_location().await {
            Ok(query) => {
                tracing::info!("Using IP-based location: {}", query);
                return query;
            }
            Err(e) => tracing::warn!("IP location failed: {}", e),
        }

        tracing::warn!("All location methods failed, using fallback {}", self.fallback);
        self.fallback.clone()
    }

    /// Step 1: device position, honoring the timeout and the fix cache.
    pub async fn device_position(&self) -> Result<Location, LocationError> {
        if !self.source.is_available() {
            return Err(LocationError::ServiceUnavailable);
        }

        let now = self.clock.now_millis();
        let max_age_ms = i64::try_from(self.options.maximum_age.as_millis()).unwrap_or(i64::MAX);
        let cached = self.last_fix.lock().clone();
        if let Some((location, taken_at)) = cached {
            if now - taken_at < max_age_ms {
                tracing::debug!("Reusing device fix from {}ms ago", now - taken_at);
                return Ok(location);
            }
        }

        let location = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        if let Some(accuracy) = location.accuracy_meters {
            tracing::debug!("Device fix accuracy: {}m", accuracy.round());
        }
        *self.last_fix.lock() = Some((location.clone(), self.clock.now_millis()));
        Ok(location)
    }

    /// Step 2: coarse position from the public IP address.
    pub async fn ip_location(&self) -> Result<String, LocationError> {
        let response = self
            .http
            .get(&self.ip_lookup_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LocationError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Rejected(format!("HTTP {}", status.as_u16())));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Network(e.into_network_error()))?;

        if body.error {
            return Err(LocationError::Rejected(
                body.reason
                    .unwrap_or_else(|| "IP geolocation failed".to_string()),
            ));
        }

        let (Some(lon), Some(lat)) = (body.longitude, body.latitude) else {
            return Err(LocationError::Other("Missing coordinates in response".into()));
        };
        if lon == 0.0 || lat == 0.0 {
            return Err(LocationError::Other("Invalid coordinates in response".into()));
        }

        tracing::info!(
            "Detected location: {}, {}",
            body.city.as_deref().unwrap_or("?"),
            body.country_name.as_deref().unwrap_or("?")
        );
        Ok(Location::new(lon, lat).to_query())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use todaydo_core::ManualClock;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Source that answers with a fixed result and counts calls
    struct FixedSource {
        result: fn() -> Result<Location, LocationError>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(result: fn() -> Result<Location, LocationError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PositionSource for FixedSource {
        fn is_available(&self) -> bool {
            true
        }

        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Location, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    /// Source that never answers
    struct HangingSource;

    #[async_trait]
    impl PositionSource for HangingSource {
        fn is_available(&self) -> bool {
            true
        }

        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Location, LocationError> {
            std::future::pending().await
        }
    }

    fn seoul() -> Result<Location, LocationError> {
        Ok(Location::new(126.978, 37.5665))
    }

    fn denied() -> Result<Location, LocationError> {
        Err(LocationError::PermissionDenied)
    }

    #[tokio::test]
    async fn test_device_position_wins() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(FixedSource::new(seoul))
            .with_ip_lookup_url(format!("{}/json/", mock_server.uri()));

        assert_eq!(resolver.resolve().await, "126.978,37.5665");
    }

    #[tokio::test]
    async fn test_device_fix_is_reused_within_max_age() {
        let source = FixedSource::new(seoul);
        let clock = Arc::new(ManualClock::at_millis(1_000_000));
        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(source.clone())
            .with_clock(clock.clone());

        resolver.device_position().await.unwrap();
        clock.advance(chrono::Duration::minutes(4));
        resolver.device_position().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::minutes(2));
        resolver.device_position().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_timeout_is_step_failure() {
        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(Arc::new(HangingSource));

        assert!(matches!(
            resolver.device_position().await,
            Err(LocationError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_ip_lookup_used_when_device_denied() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "203.0.113.7",
                "city": "Busan",
                "country_name": "South Korea",
                "latitude": 35.1796,
                "longitude": 129.0756
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(FixedSource::new(denied))
            .with_ip_lookup_url(format!("{}/json/", mock_server.uri()));

        assert_eq!(resolver.resolve().await, "129.0756,35.1796");
    }

    #[tokio::test]
    async fn test_ip_lookup_error_flag_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .mount(&mock_server)
            .await;

        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_ip_lookup_url(mock_server.uri());

        match resolver.ip_location().await {
            Err(LocationError::Rejected(reason)) => assert_eq!(reason, "RateLimited"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(resolver.resolve().await, "116.41,39.92");
    }

    #[tokio::test]
    async fn test_ip_lookup_zero_coordinates_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 0,
                "longitude": 127.0
            })))
            .mount(&mock_server)
            .await;

        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_ip_lookup_url(mock_server.uri());

        assert!(resolver.ip_location().await.is_err());
    }

    #[tokio::test]
    async fn test_custom_fallback() {
        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_ip_lookup_url("http://127.0.0.1:1/json/")
            .with_fallback("126.98,37.57");

        assert_eq!(resolver.resolve().await, "126.98,37.57");
    }

    #[tokio::test]
    async fn test_denied_then_ip_server_error_uses_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = FixedSource::new(denied);
        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(source.clone())
            .with_ip_lookup_url(format!("{}/json/", mock_server.uri()));

        assert!(matches!(
            resolver.ip_location().await,
            Err(LocationError::Rejected(reason)) if reason == "HTTP 500"
        ));
        assert_eq!(resolver.resolve().await, "116.41,39.92");
        assert_eq!(resolver.fallback(), DEFAULT_FALLBACK_LOCATION);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_then_ip_unreachable_uses_fallback() {
        let source = FixedSource::new(denied);
        let resolver = LocationResolver::new(reqwest::Client::new())
            .with_position_source(source.clone())
            .with_ip_lookup_url("http://127.0.0.1:1/json/");

        assert!(matches!(
            resolver.ip_location().await,
            Err(LocationError::Network(_))
        ));
        assert_eq!(resolver.resolve().await, DEFAULT_FALLBACK_LOCATION);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_carries_options() {
        let mut config = AppConfig::default();
        config.location.geolocation_timeout_secs = 3;
        config.location.fallback = "0.5,0.5".into();

        let resolver = LocationResolver::from_config(reqwest::Client::new(), &config);
        assert_eq!(resolver.options.timeout, Duration::from_secs(3));
        assert_eq!(resolver.options.maximum_age, Duration::from_secs(300));
        assert!(!resolver.options.high_accuracy);
        assert_eq!(resolver.fallback(), "0.5,0.5");
    }
}
