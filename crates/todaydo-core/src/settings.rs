//! User settings persisted in the key-value store.
//!
//! Settings are created with defaults on first load and updated by shallow
//! merge. Nothing here validates key formats: an empty or wrong API key is a
//! valid, if non-functional, state.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ValidationResult;
use crate::error::StoreError;
use crate::store::{keys, KvStore};

pub const DEFAULT_QWEATHER_HOST: &str = "devapi.qweather.com";

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Ko,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ko" => Ok(Self::Ko),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub pexels_api_key: String,
    pub qweather_api_key: String,
    /// Bare hostname, no scheme
    pub qweather_api_host: String,
    pub language: Language,
    /// "lon,lat" or a place name; `None` means auto-detect
    pub weather_location: Option<String>,
    pub is_first_time: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pexels_api_key: String::new(),
            qweather_api_key: String::new(),
            qweather_api_host: DEFAULT_QWEATHER_HOST.to_string(),
            language: Language::default(),
            weather_location: None,
            is_first_time: true,
        }
    }
}

impl Settings {
    pub fn pexels_key(&self) -> Option<&str> {
        non_blank(&self.pexels_api_key)
    }

    pub fn qweather_key(&self) -> Option<&str> {
        non_blank(&self.qweather_api_key)
    }

    /// Configured host, or the default when blank.
    pub fn qweather_host(&self) -> &str {
        non_blank(&self.qweather_api_host).unwrap_or(DEFAULT_QWEATHER_HOST)
    }

    pub fn weather_location(&self) -> Option<&str> {
        self.weather_location.as_deref().and_then(non_blank)
    }

    /// Settings from a stored object, merged over the defaults field by
    /// field. A missing or malformed field keeps its default.
    pub fn from_stored(stored: &Value) -> Self {
        let mut settings = Self::default();
        let Some(map) = stored.as_object() else {
            tracing::warn!("Stored settings are not an object, using defaults");
            return settings;
        };

        if let Some(v) = stored_field(map, "pexelsApiKey") {
            settings.pexels_api_key = v;
        }
        if let Some(v) = stored_field(map, "qweatherApiKey") {
            settings.qweather_api_key = v;
        }
        if let Some(v) = stored_field(map, "qweatherApiHost") {
            settings.qweather_api_host = v;
        }
        if let Some(v) = stored_field(map, "language") {
            settings.language = v;
        }
        if let Some(v) = stored_field(map, "weatherLocation") {
            settings.weather_location = v;
        }
        if let Some(v) = stored_field(map, "isFirstTime") {
            settings.is_first_time = v;
        }
        settings
    }

    /// Advisory checks; settings are stored regardless of the outcome.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.pexels_key().is_none() {
            result.add_warning(
                "pexelsApiKey",
                "Pexels API key not set - background images are disabled",
            );
        }
        if self.qweather_key().is_none() {
            result.add_warning(
                "qweatherApiKey",
                "QWeather API key not set - weather is unavailable",
            );
        }
        if self.qweather_api_host.contains("://") || self.qweather_api_host.contains('/') {
            result.add_warning(
                "qweatherApiHost",
                format!(
                    "Expected a bare hostname, got: {}",
                    self.qweather_api_host
                ),
            );
        }

        result
    }
}

fn stored_field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<T> {
    let value = map.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Ignoring stored setting {}: {}", name, e);
            None
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Partial settings update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub pexels_api_key: Option<String>,
    pub qweather_api_key: Option<String>,
    pub qweather_api_host: Option<String>,
    pub language: Option<Language>,
    /// `Some(None)` clears the location override
    pub weather_location: Option<Option<String>>,
    pub is_first_time: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.pexels_api_key.is_none()
            && self.qweather_api_key.is_none()
            && self.qweather_api_host.is_none()
            && self.language.is_none()
            && self.weather_location.is_none()
            && self.is_first_time.is_none()
    }

    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.pexels_api_key {
            settings.pexels_api_key = v;
        }
        if let Some(v) = self.qweather_api_key {
            settings.qweather_api_key = v;
        }
        if let Some(v) = self.qweather_api_host {
            settings.qweather_api_host = v;
        }
        if let Some(v) = self.language {
            settings.language = v;
        }
        if let Some(v) = self.weather_location {
            settings.weather_location = v;
        }
        if let Some(v) = self.is_first_time {
            settings.is_first_time = v;
        }
    }
}

/// Settings held in memory and mirrored to the store on every change.
#[derive(Debug)]
pub struct SettingsStore {
    store: KvStore,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings, persisting defaults when none are stored yet.
    ///
    /// An unreadable stored value is left in place until the next update.
    pub fn load(store: KvStore) -> Result<Self, StoreError> {
        let current = match store.get_opt::<Value>(keys::SETTINGS) {
            Some(stored) => Settings::from_stored(&stored),
            None if store.contains(keys::SETTINGS) => Settings::default(),
            None => {
                let defaults = Settings::default();
                store.set(keys::SETTINGS, &defaults)?;
                tracing::info!("Initialized default settings");
                defaults
            }
        };

        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> Settings {
        self.current.read().clone()
    }

    /// Merge `patch` over the current settings and persist the result.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let mut current = self.current.write();
        let mut next = current.clone();
        patch.apply(&mut next);
        self.store.set(keys::SETTINGS, &next)?;
        *current = next.clone();
        Ok(next)
    }

    pub fn reset(&self) -> Result<Settings, StoreError> {
        let mut current = self.current.write();
        let defaults = Settings::default();
        self.store.set(keys::SETTINGS, &defaults)?;
        *current = defaults.clone();
        tracing::info!("Settings reset to defaults");
        Ok(defaults)
    }

    pub fn complete_first_time_setup(&self) -> Result<Settings, StoreError> {
        self.update(SettingsPatch {
            is_first_time: Some(false),
            ..Default::default()
        })
    }
}
