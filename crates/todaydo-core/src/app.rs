use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{AppConfig, KvStore, SettingsStore};

/// Shared application handles: config, store, settings and HTTP client.
///
/// Feature providers are built from these handles; nothing reaches the
/// store through a global.
pub struct App {
    config: Arc<AppConfig>,
    store: KvStore,
    settings: Arc<SettingsStore>,
    http: reqwest::Client,
}

impl App {
    /// Create an application instance from the on-disk config
    pub fn new() -> Result<Self> {
        let (config, _warnings) = AppConfig::load_validated()?;
        Self::with_config(config)
    }

    /// Create an application instance from an explicit config
    pub fn with_config(config: AppConfig) -> Result<Self> {
        let store = KvStore::open(&config.data_dir).context("Failed to open data directory")?;
        let settings = SettingsStore::load(store.clone()).context("Failed to load settings")?;

        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        tracing::info!("Data directory: {}", config.data_dir.display());

        Ok(Self {
            config: Arc::new(config),
            store,
            settings: Arc::new(settings),
            http,
        })
    }

    /// Get reference to application config
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        self.settings.clone()
    }

    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }
}
