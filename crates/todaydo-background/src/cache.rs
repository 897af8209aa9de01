use todaydo_core::store::keys;
use todaydo_core::{KvStore, StoreError};

use crate::types::CachedBackground;

/// How long one background is shown before a new one is fetched
pub const BACKGROUND_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct BackgroundCache {
    store: KvStore,
    ttl_ms: i64,
}

impl BackgroundCache {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            ttl_ms: BACKGROUND_TTL_MS,
        }
    }

    pub fn get(&self) -> Option<CachedBackground> {
        self.store.get_opt(keys::BACKGROUND)
    }

    /// Stored background if it is younger than the TTL at `now_ms`.
    pub fn fresh(&self, now_ms: i64) -> Option<CachedBackground> {
        self.get().filter(|bg| bg.is_fresh(now_ms, self.ttl_ms))
    }

    /// Replace the stored background. `fetchedAt` never moves backwards.
    pub fn put(&self, mut background: CachedBackground) -> Result<CachedBackground, StoreError> {
        if let Some(previous) = self.get() {
            background.fetched_at = background.fetched_at.max(previous.fetched_at);
        }
        self.store.set(keys::BACKGROUND, &background)?;
        Ok(background)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn bg(fetched_at: i64) -> CachedBackground {
        CachedBackground {
            url: format!("https://images.example/{}.jpeg", fetched_at),
            photographer: "Ansel".into(),
            photographer_url: "https://www.pexels.com/@ansel".into(),
            fetched_at,
        }
    }

    #[test]
    fn test_fresh_within_a_day() {
        let cache = BackgroundCache::new(KvStore::in_memory());
        cache.put(bg(0)).unwrap();

        assert!(cache.fresh(BACKGROUND_TTL_MS - 1).is_some());
        assert!(cache.fresh(BACKGROUND_TTL_MS).is_none());
        // Stale entries are still readable
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_fetched_at_never_decreases() {
        let cache = BackgroundCache::new(KvStore::in_memory());
        cache.put(bg(5_000)).unwrap();
        let stored = cache.put(bg(1_000)).unwrap();

        assert_eq!(stored.fetched_at, 5_000);
        assert_eq!(stored.url, "https://images.example/1000.jpeg");
        assert_eq!(cache.get().unwrap().fetched_at, 5_000);
    }
}
