use serde::{Deserialize, Serialize};

/// Search categories a background is drawn from
pub const CATEGORIES: [&str; 7] = [
    "nature",
    "landscape",
    "minimal",
    "sky",
    "mountain",
    "ocean",
    "forest",
];

/// Background image as stored under `today-do-background`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedBackground {
    /// Full-resolution image URL
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
    /// Unix milliseconds
    pub fetched_at: i64,
}

impl CachedBackground {
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.fetched_at < ttl_ms
    }
}

/// Pexels search response (fields we use)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub id: u64,
    pub photographer: String,
    pub photographer_url: String,
    pub src: PhotoSources,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSources {
    pub original: String,
}

impl Photo {
    pub fn into_background(self, fetched_at: i64) -> CachedBackground {
        CachedBackground {
            url: self.src.original,
            photographer: self.photographer,
            photographer_url: self.photographer_url,
            fetched_at,
        }
    }
}
