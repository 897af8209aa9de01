//! Pexels photo search client.

use rand::seq::SliceRandom;
use todaydo_core::ReqwestErrorExt;
use tracing::instrument;

use crate::error::BackgroundError;
use crate::types::{Photo, SearchResponse, CATEGORIES};

pub const DEFAULT_PEXELS_BASE_URL: &str = "https://api.pexels.com/v1";
const PER_PAGE: &str = "20";

#[derive(Debug, Clone)]
pub struct PexelsClient {
    client: reqwest::Client,
    base_url: String,
}

impl PexelsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// One photo from a random category's first result page.
    pub async fn random_photo(&self, api_key: &str) -> Result<Photo, BackgroundError> {
        let category = CATEGORIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CATEGORIES[0]);

        let photos = self.search(api_key, category).await?;
        photos
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| BackgroundError::NoPhotos(category.to_string()))
    }

    /// Landscape photos for `query`.
    #[instrument(skip(self, api_key), level = "info")]
    pub async fn search(&self, api_key: &str, query: &str) -> Result<Vec<Photo>, BackgroundError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .query(&[
                ("query", query),
                ("per_page", PER_PAGE),
                ("orientation", "landscape"),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackgroundError::Http(status.as_u16()));
        }

        let body: SearchResponse = response.json().await.map_err(|e| e.into_network_error())?;
        tracing::debug!("Pexels returned {} photos for {}", body.photos.len(), query);
        Ok(body.photos)
    }
}
