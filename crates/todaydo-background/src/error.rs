use todaydo_core::{NetworkError, StoreError};

/// Background fetch errors. The provider logs these and shows no image.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("Pexels API key is not configured")]
    NotConfigured,
    #[error("Pexels HTTP error: {0}")]
    Http(u16),
    #[error("Pexels request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("No photos for category {0}")]
    NoPhotos(String),
    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}

impl BackgroundError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotConfigured => "Add a Pexels API key in Settings to enable background images.",
            Self::Http(401) | Self::Http(403) => "Pexels rejected the API key.",
            Self::Http(429) => "Pexels rate limit reached. Try again later.",
            Self::Http(_) => "Pexels returned an error.",
            Self::Network(e) => e.user_message(),
            Self::NoPhotos(_) => "No background image was found.",
            Self::Store(e) => e.user_message(),
        }
    }
}
