//! Weather provider: location bookkeeping, 30-minute cache and the
//! geocode-then-observe fetch.

use std::sync::Arc;

use parking_lot::Mutex;
use todaydo_core::store::keys;
use todaydo_core::{App, Clock, KvStore, SettingsStore, SystemClock};

use crate::cache::WeatherCache;
use crate::client::QWeatherClient;
use crate::location::LocationResolver;
use crate::types::{Weather, WeatherError};

/// What the weather widget renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub loading: bool,
    pub weather: Option<Weather>,
    /// Localized message of the last failed fetch
    pub error: Option<String>,
    pub location: Option<String>,
}

pub struct WeatherProvider {
    client: QWeatherClient,
    settings: Arc<SettingsStore>,
    store: KvStore,
    cache: WeatherCache,
    resolver: Arc<LocationResolver>,
    clock: Arc<dyn Clock>,
    state: Mutex<WeatherState>,
}

impl std::fmt::Debug for WeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherProvider")
            .field("client", &self.client)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl WeatherProvider {
    pub fn new(
        client: QWeatherClient,
        settings: Arc<SettingsStore>,
        store: KvStore,
        resolver: Arc<LocationResolver>,
    ) -> Self {
        Self {
            client,
            settings,
            cache: WeatherCache::new(store.clone()),
            store,
            resolver,
            clock: Arc::new(SystemClock),
            state: Mutex::new(WeatherState::default()),
        }
    }

    /// Provider wired to the application's store, settings and endpoints.
    pub fn from_app(app: &App) -> Self {
        let http = app.http_client();
        let client = match &app.config().endpoints.qweather_base_url {
            Some(base) => QWeatherClient::with_base_url(http.clone(), base.clone()),
            None => QWeatherClient::new(http.clone()),
        };
        let resolver = LocationResolver::from_config(http, app.config());
        Self::new(client, app.settings(), app.store().clone(), Arc::new(resolver))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Snapshot of the widget state.
    pub fn state(&self) -> WeatherState {
        self.state.lock().clone()
    }

    /// Location in use, once initialized.
    pub fn location(&self) -> Option<String> {
        self.state.lock().location.clone()
    }

    /// Decide the location for this provider instance and persist it.
    ///
    /// Priority: stored location, then the settings override, then
    /// auto-detection. Later calls return the decided value.
    pub async fn initialize_location(&self) -> String {
        if let Some(location) = self.location() {
            return location;
        }

        let stored = self
            .store
            .get_opt::<String>(keys::WEATHER_LOCATION)
            .filter(|l| !l.trim().is_empty());

        let location = match stored {
            Some(location) => {
                tracing::info!("Using stored location: {}", location);
                location
            }
            None => {
                let from_settings = self.settings.get().weather_location().map(str::to_string);
                match from_settings {
                    Some(location) => {
                        tracing::info!("Using location from settings: {}", location);
                        location
                    }
                    None => {
                        tracing::info!("No location configured, attempting auto-detection");
                        self.resolver.resolve().await
                    }
                }
            }
        };

        if let Err(e) = self.store.set(keys::WEATHER_LOCATION, &location) {
            tracing::warn!("Failed to persist weather location: {}", e);
        }
        self.state.lock().location = Some(location.clone());
        location
    }

    /// Current conditions for the provider's location, from cache when fresh.
    pub async fn load(&self) -> Result<Weather, WeatherError> {
        let location = self.initialize_location().await;

        if let Some(weather) = self.cache.lookup(&location, self.clock.now_millis()) {
            let mut state = self.state.lock();
            state.loading = false;
            state.error = None;
            state.weather = Some(weather.clone());
            return Ok(weather);
        }

        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let settings = self.settings.get();
        tracing::info!("Loading weather for location: {}", location);
        let result = self.client.fetch(&settings, &location).await;

        match result {
            Ok(weather) => {
                if let Err(e) = self.cache.put(&location, &weather, self.clock.now_millis()) {
                    tracing::warn!("Failed to cache weather: {}", e);
                }
                let mut state = self.state.lock();
                state.loading = false;
                state.error = None;
                state.weather = Some(weather.clone());
                Ok(weather)
            }
            Err(e) => {
                tracing::error!("Weather fetch error: {}", e);
                let mut state = self.state.lock();
                state.loading = false;
                state.weather = None;
                state.error = Some(e.user_message(settings.language));
                Err(e)
            }
        }
    }

    /// Switch to `location` and drop the cached observation.
    pub fn update_location(&self, location: &str) -> Result<(), WeatherError> {
        if location.trim().is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        self.store.set(keys::WEATHER_LOCATION, location)?;
        self.cache.clear()?;

        let mut state = self.state.lock();
        state.location = Some(location.to_string());
        state.weather = None;
        tracing::info!("Weather location set to {}", location);
        Ok(())
    }

    /// Drop the cached observation and fetch again for the same location.
    pub async fn refresh(&self) -> Result<Weather, WeatherError> {
        self.cache.clear()?;
        self.load().await
    }
}
