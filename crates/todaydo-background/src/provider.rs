//! Background provider: one cached Pexels photo, renewed daily.
//!
//! Failures never surface to the caller. Without an API key, or when Pexels
//! cannot be reached, the dashboard keeps whatever image it already has (or
//! none) and the reason is logged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use todaydo_core::{App, Clock, KvStore, SettingsStore, SystemClock};

use crate::cache::BackgroundCache;
use crate::client::PexelsClient;
use crate::error::BackgroundError;
use crate::types::CachedBackground;

/// Holds the loading flag up until the fetch completes or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct BackgroundProvider {
    client: PexelsClient,
    settings: Arc<SettingsStore>,
    cache: BackgroundCache,
    clock: Arc<dyn Clock>,
    loading: AtomicBool,
}

impl std::fmt::Debug for BackgroundProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundProvider")
            .field("client", &self.client)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}

impl BackgroundProvider {
    pub fn new(client: PexelsClient, settings: Arc<SettingsStore>, store: KvStore) -> Self {
        Self {
            client,
            settings,
            cache: BackgroundCache::new(store),
            clock: Arc::new(SystemClock),
            loading: AtomicBool::new(false),
        }
    }

    pub fn from_app(app: &App) -> Self {
        let client = PexelsClient::new(
            app.http_client(),
            app.config().endpoints.pexels_base_url.clone(),
        );
        Self::new(client, app.settings(), app.store().clone())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Currently stored background, whatever its age.
    pub fn background(&self) -> Option<CachedBackground> {
        self.cache.get()
    }

    /// Background to show: the cached one while it is under a day old,
    /// otherwise a newly fetched one (falling back to the stored entry).
    pub async fn load(&self) -> Option<CachedBackground> {
        if let Some(background) = self.cache.fresh(self.clock.now_millis()) {
            tracing::debug!("Using cached background by {}", background.photographer);
            return Some(background);
        }
        self.refresh().await
    }

    /// Fetch a new background regardless of the cached one.
    pub async fn refresh(&self) -> Option<CachedBackground> {
        let result = {
            let _loading = LoadingGuard::start(&self.loading);
            self.fetch().await
        };

        match result {
            Ok(background) => Some(background),
            Err(BackgroundError::NotConfigured) => {
                tracing::warn!("Pexels API key not configured; add it in Settings");
                self.cache.get()
            }
            Err(e) => {
                tracing::error!("Failed to load background: {}", e);
                self.cache.get()
            }
        }
    }

    async fn fetch(&self) -> Result<CachedBackground, BackgroundError> {
        let settings = self.settings.get();
        let api_key = settings.pexels_key().ok_or(BackgroundError::NotConfigured)?;

        let photo = self.client.random_photo(api_key).await?;
        let background = self.cache.put(photo.into_background(self.clock.now_millis()))?;
        tracing::info!("New background by {}", background.photographer);
        Ok(background)
    }
}
