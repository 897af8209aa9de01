//! Background images for Today Do
//!
//! A random landscape photo from Pexels, cached for 24 hours.

pub mod cache;
pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use cache::{BackgroundCache, BACKGROUND_TTL_MS};
pub use client::{PexelsClient, DEFAULT_PEXELS_BASE_URL};
pub use error::BackgroundError;
pub use provider::BackgroundProvider;
pub use types::{CachedBackground, Photo, CATEGORIES};
