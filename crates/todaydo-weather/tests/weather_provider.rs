//! Integration tests for WeatherProvider against a mock QWeather server.

use std::sync::Arc;

use todaydo_core::store::keys;
use todaydo_core::{KvStore, Language, ManualClock, SettingsPatch, SettingsStore};
use todaydo_weather::{
    CachedWeather, LocationResolver, QWeatherClient, Weather, WeatherError, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const T0: i64 = 1_760_000_000_000;
const MINUTE_MS: i64 = 60 * 1000;

/// Helper to create a city lookup response
fn lookup_body(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "code": "200",
        "location": [{
            "name": name, "id": id, "lat": "37.56", "lon": "126.97",
            "adm2": name, "adm1": name, "country": "South Korea"
        }]
    })
}

/// Helper to create a weather now response
fn now_body(temp: &str, wind_kmh: &str) -> serde_json::Value {
    serde_json::json!({
        "code": "200",
        "updateTime": "2026-10-18T09:00+08:00",
        "now": {
            "obsTime": "2026-10-18T08:50+08:00",
            "temp": temp,
            "feelsLike": temp,
            "icon": "100",
            "text": "晴",
            "windSpeed": wind_kmh,
            "humidity": "45"
        }
    })
}

fn cached(location: &str, fetched_at: i64) -> CachedWeather {
    CachedWeather {
        data: Weather {
            temp: 11,
            condition: "Cached".into(),
            icon: "104".into(),
            location: location.into(),
            humidity: 70,
            wind_speed: 1.5,
        },
        fetched_at,
        location: location.into(),
    }
}

struct Harness {
    server: MockServer,
    store: KvStore,
    clock: Arc<ManualClock>,
    provider: WeatherProvider,
}

async fn harness(api_key: &str) -> Harness {
    let server = MockServer::start().await;
    let store = KvStore::in_memory();
    let settings = Arc::new(SettingsStore::load(store.clone()).unwrap());
    settings
        .update(SettingsPatch {
            qweather_api_key: Some(api_key.into()),
            ..Default::default()
        })
        .unwrap();

    let http = reqwest::Client::new();
    let resolver = LocationResolver::new(http.clone())
        .with_ip_lookup_url(format!("{}/ip/json/", server.uri()));
    let clock = Arc::new(ManualClock::at_millis(T0));
    let provider = WeatherProvider::new(
        QWeatherClient::with_base_url(http, server.uri()),
        settings,
        store.clone(),
        Arc::new(resolver),
    )
    .with_clock(clock.clone());

    Harness {
        server,
        store,
        clock,
        provider,
    }
}

async fn mount_success(server: &MockServer, location: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .and(query_param("location", location))
        .and(query_param("key", "qw-key"))
        .and(query_param("lang", "zh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body("101", location)))
        .expect(expected_calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v7/weather/now"))
        .and(query_param("location", "101"))
        .and(query_param("unit", "m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(now_body("21", "36")))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fresh_cache_makes_no_request() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    h.store
        .set(keys::WEATHER_DATA, &cached("Seoul", T0 - 5 * MINUTE_MS))
        .unwrap();
    mount_success(&h.server, "Seoul", 0).await;

    let weather = h.provider.load().await.unwrap();

    assert_eq!(weather, cached("Seoul", 0).data);
    assert_eq!(h.provider.state().weather, Some(weather));
}

#[tokio::test]
async fn test_stale_cache_refetches_once_and_replaces_entry() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    h.store.set(keys::WEATHER_DATA, &cached("Seoul", T0)).unwrap();
    mount_success(&h.server, "Seoul", 1).await;

    h.clock.advance(chrono::Duration::minutes(31));
    let weather = h.provider.load().await.unwrap();

    assert_eq!(weather.temp, 21);
    assert_eq!(weather.condition, "晴");
    assert_eq!(weather.humidity, 45);
    assert_eq!(weather.wind_speed, 10.0);

    let entry: CachedWeather = h.store.get_opt(keys::WEATHER_DATA).unwrap();
    assert_eq!(entry.location, "Seoul");
    assert_eq!(entry.fetched_at, T0 + 31 * MINUTE_MS);
    assert_eq!(entry.data, weather);
}

#[tokio::test]
async fn test_cache_for_other_location_is_ignored() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Busan").unwrap();
    h.store.set(keys::WEATHER_DATA, &cached("Seoul", T0)).unwrap();
    mount_success(&h.server, "Busan", 1).await;

    h.clock.advance(chrono::Duration::minutes(10));
    let weather = h.provider.load().await.unwrap();

    assert_eq!(weather.location, "Busan");
}

#[tokio::test]
async fn test_update_location_forces_fetch() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    h.store.set(keys::WEATHER_DATA, &cached("Seoul", T0)).unwrap();
    mount_success(&h.server, "Daegu", 1).await;

    h.provider.load().await.unwrap();
    h.provider.update_location("Daegu").unwrap();
    assert!(h.store.get_opt::<CachedWeather>(keys::WEATHER_DATA).is_none());

    let weather = h.provider.load().await.unwrap();
    assert_eq!(weather.location, "Daegu");
    assert_eq!(
        h.store.get_opt::<String>(keys::WEATHER_LOCATION).as_deref(),
        Some("Daegu")
    );
}

#[tokio::test]
async fn test_refresh_keeps_location_and_refetches() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    h.store.set(keys::WEATHER_DATA, &cached("Seoul", T0)).unwrap();
    mount_success(&h.server, "Seoul", 1).await;

    let weather = h.provider.refresh().await.unwrap();

    assert_eq!(weather.temp, 21);
    assert_eq!(h.provider.location().as_deref(), Some("Seoul"));
}

#[tokio::test]
async fn test_unauthorized_geocode_skips_observation() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();

    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "401"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v7/weather/now"))
        .respond_with(ResponseTemplate::new(200).set_body_json(now_body("1", "1")))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.provider.load().await.unwrap_err();

    assert!(matches!(err, WeatherError::Api { ref code, .. } if code == "401"));
    assert_eq!(
        h.provider.state().error.as_deref(),
        Some("API 인증 실패 - API 키를 확인해주세요")
    );
}

#[tokio::test]
async fn test_empty_lookup_names_the_input() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Atlantis").unwrap();

    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"code": "200", "location": []})),
        )
        .mount(&h.server)
        .await;

    let err = h.provider.load().await.unwrap_err();

    assert!(matches!(err, WeatherError::LocationNotFound(ref input) if input == "Atlantis"));
    assert!(err.user_message(Language::En).contains("'Atlantis'"));
}

#[tokio::test]
async fn test_failure_leaves_cache_entry_alone() {
    let h = harness("qw-key").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    h.store.set(keys::WEATHER_DATA, &cached("Seoul", T0)).unwrap();

    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    h.clock.advance(chrono::Duration::hours(1));
    let err = h.provider.load().await.unwrap_err();

    assert!(matches!(err, WeatherError::Http { status: 500, .. }));
    let entry: CachedWeather = h.store.get_opt(keys::WEATHER_DATA).unwrap();
    assert_eq!(entry.fetched_at, T0);
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let h = harness("").await;
    h.store.set(keys::WEATHER_LOCATION, "Seoul").unwrap();
    mount_success(&h.server, "Seoul", 0).await;

    let err = h.provider.load().await.unwrap_err();

    assert!(matches!(err, WeatherError::NotConfigured));
}

#[tokio::test]
async fn test_ip_failure_falls_back_to_default_coordinate() {
    let h = harness("qw-key").await;

    Mock::given(method("GET"))
        .and(path("/ip/json/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.server)
        .await;
    mount_success(&h.server, "116.41,39.92", 1).await;

    let weather = h.provider.load().await.unwrap();

    assert_eq!(h.provider.location().as_deref(), Some("116.41,39.92"));
    assert_eq!(weather.location, "116.41,39.92");
}
