use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Coordinate used when no location source produced anything (Beijing).
pub const DEFAULT_FALLBACK_LOCATION: &str = "116.41,39.92";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the key-value store files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream API base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Location auto-detection settings
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("TodayDo/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Pexels API root (search lives at `<base>/search`)
    #[serde(default = "default_pexels_base_url")]
    pub pexels_base_url: String,

    /// IP geolocation lookup URL
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,

    /// Full QWeather base URL (scheme included). When unset, the host from
    /// the user settings is used with https.
    #[serde(default)]
    pub qweather_base_url: Option<String>,
}

fn default_pexels_base_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_ip_lookup_url() -> String {
    "https://ipapi.co/json/".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            pexels_base_url: default_pexels_base_url(),
            ip_lookup_url: default_ip_lookup_url(),
            qweather_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// "lon,lat" used when every detection method fails
    #[serde(default = "default_fallback_location")]
    pub fallback: String,

    /// How long to wait for a device position fix
    #[serde(default = "default_geolocation_timeout_secs")]
    pub geolocation_timeout_secs: u64,

    /// Reuse a position fix younger than this
    #[serde(default = "default_position_max_age_secs")]
    pub position_max_age_secs: u64,
}

fn default_fallback_location() -> String {
    DEFAULT_FALLBACK_LOCATION.to_string()
}

fn default_geolocation_timeout_secs() -> u64 {
    10
}

fn default_position_max_age_secs() -> u64 {
    300
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_location(),
            geolocation_timeout_secs: default_geolocation_timeout_secs(),
            position_max_age_secs: default_position_max_age_secs(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("today-do")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

/// Parse a `"lon,lat"` pair. Returns `None` unless both parts are numbers in
/// range.
pub fn parse_lon_lat(value: &str) -> Option<(f64, f64)> {
    let (lon, lat) = value.split_once(',')?;
    let lon: f64 = lon.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) {
        Some((lon, lat))
    } else {
        None
    }
}

impl AppConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::checked(Self::load()?)
    }

    /// Load and validate configuration from an explicit path
    pub fn load_validated_from(config_path: &Path) -> Result<(Self, ValidationResult)> {
        Self::checked(Self::load_from(config_path)?)
    }

    fn checked(config: Self) -> Result<(Self, ValidationResult)> {
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.endpoints.pexels_base_url,
            "endpoints.pexels_base_url",
            &mut result,
        );
        self.validate_url(
            &self.endpoints.ip_lookup_url,
            "endpoints.ip_lookup_url",
            &mut result,
        );
        if let Some(base) = &self.endpoints.qweather_base_url {
            self.validate_url(base, "endpoints.qweather_base_url", &mut result);
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        } else if self.http.timeout_secs > 120 {
            result.add_warning("http.timeout_secs", "Timeout is unusually long (>120s)");
        }

        if parse_lon_lat(&self.location.fallback).is_none() {
            result.add_error(
                "location.fallback",
                format!(
                    "Expected \"longitude,latitude\", got: {}",
                    self.location.fallback
                ),
            );
        }

        if self.location.geolocation_timeout_secs == 0 {
            result.add_error(
                "location.geolocation_timeout_secs",
                "Timeout must be greater than 0",
            );
        }

        if self.data_dir.exists() && !self.data_dir.is_dir() {
            result.add_error(
                "data_dir",
                format!("Path is not a directory: {}", self.data_dir.display()),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("today-do");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = AppConfig::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = AppConfig::default();
        config.endpoints.pexels_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "endpoints.pexels_base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = AppConfig::default();
        config.endpoints.qweather_base_url = Some("ftp://weather.example.com".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "http.timeout_secs"));
    }

    #[test]
    fn test_bad_fallback_location() {
        let mut config = AppConfig::default();
        config.location.fallback = "Beijing".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "location.fallback"));
    }

    #[test]
    fn test_parse_lon_lat() {
        assert_eq!(parse_lon_lat("116.41,39.92"), Some((116.41, 39.92)));
        assert_eq!(parse_lon_lat(" 126.98 , 37.57 "), Some((126.98, 37.57)));
        assert_eq!(parse_lon_lat("Seoul"), None);
        assert_eq!(parse_lon_lat("200,10"), None);
        assert_eq!(parse_lon_lat("10,95"), None);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.location.fallback, DEFAULT_FALLBACK_LOCATION);

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.http.timeout_secs, config.http.timeout_secs);
    }

    #[test]
    fn test_load_validated_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = 0\n").unwrap();

        let err = AppConfig::load_validated_from(&path).unwrap_err();
        assert!(err.to_string().contains("http.timeout_secs"));

        std::fs::write(&path, "[http]\ntimeout_secs = 300\n").unwrap();
        let (config, validation) = AppConfig::load_validated_from(&path).unwrap();
        assert_eq!(config.http.timeout_secs, 300);
        assert!(validation.warnings.iter().any(|w| w.field == "http.timeout_secs"));
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = 3\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.endpoints.ip_lookup_url, "https://ipapi.co/json/");
        assert_eq!(config.location.position_max_age_secs, 300);
    }
}
