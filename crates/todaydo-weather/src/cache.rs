//! Single-slot weather cache in the key-value store.

use todaydo_core::store::keys;
use todaydo_core::{KvStore, StoreError};

use crate::types::{CachedWeather, Weather};

/// Maximum age of a cached observation
pub const WEATHER_TTL_MS: i64 = 30 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct WeatherCache {
    store: KvStore,
    ttl_ms: i64,
}

impl WeatherCache {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            ttl_ms: WEATHER_TTL_MS,
        }
    }

    /// Stored entry regardless of age or location.
    pub fn get(&self) -> Option<CachedWeather> {
        self.store.get_opt(keys::WEATHER_DATA)
    }

    /// Cached observation when it was fetched for exactly `location` and is
    /// still within the TTL at `now_ms`.
    pub fn lookup(&self, location: &str, now_ms: i64) -> Option<Weather> {
        let entry = self.get()?;
        if entry.is_fresh_for(location, now_ms, self.ttl_ms) {
            tracing::debug!(
                "Weather cache hit for {} (age {}s)",
                location,
                (now_ms - entry.fetched_at) / 1000
            );
            Some(entry.data)
        } else {
            tracing::debug!("Weather cache miss for {}", location);
            None
        }
    }

    /// Replace the stored entry wholesale.
    pub fn put(&self, location: &str, data: &Weather, now_ms: i64) -> Result<(), StoreError> {
        let entry = CachedWeather {
            data: data.clone(),
            fetched_at: now_ms,
            location: location.to_string(),
        };
        self.store.set(keys::WEATHER_DATA, &entry)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::WEATHER_DATA)
    }
}
