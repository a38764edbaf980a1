//! Unsplash API client.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://api.unsplash.com`
//! - **Authentication**: `Authorization: Client-ID <access key>`.
//! - **Download tracking**: Unsplash requires `/photos/{id}/download` to be
//!   hit whenever a photo is saved, before the image itself is fetched.

pub mod response;

pub use response::{DownloadLink, Photo, PhotoUrls, SearchResults};

use reqwest::header;
use stellar_core::Error;

use crate::fetch::{FetchClient, url::with_query};

/// Default base URL for the Unsplash API.
const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Results per search page, matching the extension's grid.
const SEARCH_PAGE_SIZE: &str = "28";

/// Unsplash client configuration.
#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    pub access_key: String,
    /// Base URL (default: https://api.unsplash.com).
    pub base_url: String,
}

impl UnsplashConfig {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self { access_key: access_key.into(), base_url: DEFAULT_BASE_URL.to_string() }
    }
}

/// Size variant of a random photo's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Standard,
    High,
}

impl Resolution {
    fn width(self) -> &'static str {
        match self {
            Resolution::Standard => "2000",
            Resolution::High => "2560",
        }
    }

    /// Cache filename for this variant.
    pub fn cache_filename(self) -> &'static str {
        match self {
            Resolution::Standard => "standard.txt",
            Resolution::High => "high.txt",
        }
    }

    /// Image URL for this variant, derived from the photo's raw URL.
    pub fn image_url(self, photo: &Photo) -> Result<String, Error> {
        let raw = url::Url::parse(&photo.urls.raw)
            .map_err(|e| Error::Decode(format!("invalid raw URL for photo {}: {e}", photo.id)))?;
        Ok(with_query(raw, &[("q", "85"), ("w", self.width())]).to_string())
    }
}

/// Check that `id` is a bare photo id that can be placed in a URL path.
///
/// Unsplash ids are ASCII letters, digits, `-` and `_`.
pub fn check_photo_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::InvalidInput("photo id not specified".into()));
    }
    if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
        return Err(Error::InvalidInput(format!("invalid photo id: {id}")));
    }
    Ok(())
}

/// Unsplash API client.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    fetch: FetchClient,
    config: UnsplashConfig,
}

impl UnsplashClient {
    pub fn new(fetch: FetchClient, config: UnsplashConfig) -> Result<Self, Error> {
        if config.access_key.is_empty() {
            return Err(Error::InvalidInput("Unsplash access key must not be empty".into()));
        }
        Ok(Self { fetch, config })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.fetch
            .http()
            .get(format!("{}{}", self.config.base_url, path))
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.config.access_key))
            .header("Accept-Version", "v1")
    }

    /// Register a download of photo `id` with Unsplash.
    pub async fn track_download(&self, id: &str) -> Result<DownloadLink, Error> {
        check_photo_id(id)?;

        tracing::debug!(photo_id = id, "tracking Unsplash download");

        self.fetch
            .execute_json(self.get(&format!("/photos/{id}/download")))
            .await
    }

    /// Fetch one random photo, optionally restricted to comma-separated collections.
    pub async fn random_photo(&self, collections: Option<&str>) -> Result<Photo, Error> {
        let mut request = self.get("/photos/random");
        if let Some(collections) = collections.filter(|c| !c.is_empty()) {
            request = request.query(&[("collections", collections)]);
        }

        self.fetch.execute_json(request).await
    }

    /// Search photos by keyword.
    pub async fn search(&self, query: &str, page: u32, collections: Option<&str>) -> Result<SearchResults, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("search query cannot be empty".into()));
        }

        let page = page.max(1).to_string();
        let mut request = self
            .get("/search/photos")
            .query(&[("query", query), ("page", page.as_str()), ("per_page", SEARCH_PAGE_SIZE)]);
        if let Some(collections) = collections.filter(|c| !c.is_empty()) {
            request = request.query(&[("collections", collections)]);
        }

        self.fetch.execute_json(request).await
    }
}
